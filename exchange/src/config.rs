//! Exchange construction parameters.

/// Pool sizing for one side of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Bytes per transfer region.
    pub buffer_size: usize,
    /// Regions allocated per direction; the pool holds twice as many slots.
    pub buffer_count: usize,
}

impl Default for Config {
    /// One full default codec channel (32Ki cells of 4 bytes) per region,
    /// four regions per direction.
    fn default() -> Self {
        Config {
            buffer_size: 32 * 1024 * 4,
            buffer_count: 4,
        }
    }
}

impl Config {
    /// A configuration with `buffer_count` regions of `buffer_size` bytes.
    pub fn new(buffer_size: usize, buffer_count: usize) -> Self {
        Config { buffer_size, buffer_count }
    }

    /// Constructs a configuration by parsing supplied text arguments.
    ///
    /// Most commonly this consumes `std::env::args().skip(1)`. Recognized
    /// options:
    ///
    /// - `-s`, `--size BYTES`: bytes per region,
    /// - `-b`, `--buffers NUM`: regions per direction.
    #[cfg(feature = "getopts")]
    pub fn from_args<I: Iterator<Item = String>>(args: I) -> Result<Config, String> {
        let mut opts = getopts::Options::new();
        opts.optopt("s", "size", "bytes per transfer region", "BYTES");
        opts.optopt("b", "buffers", "regions per direction", "NUM");

        let matches = opts.parse(args).map_err(|e| e.to_string())?;
        let defaults = Config::default();

        let buffer_size = match matches.opt_str("s") {
            Some(text) => text.parse().map_err(|e| format!("invalid --size: {}", e))?,
            None => defaults.buffer_size,
        };
        let buffer_count = match matches.opt_str("b") {
            Some(text) => text.parse().map_err(|e| format!("invalid --buffers: {}", e))?,
            None => defaults.buffer_count,
        };
        if buffer_count == 0 {
            return Err("--buffers must be at least 1".to_owned());
        }

        Ok(Config { buffer_size, buffer_count })
    }
}
