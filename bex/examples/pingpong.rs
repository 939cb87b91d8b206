//! Two threads ping-pong call batches through a buffer exchange.
//!
//! Run with `cargo run --example pingpong -- -b 2` to change the pool size.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use bex::exchange::logging::ExchangeEvent;
use bex::{
    transport, ArgKind, BufferExchange, Call, Config, Endpoint, Identity, Procedure,
    ProcedureTable, Value,
};

const ROUNDS: u32 = 1000;

fn main() {
    let table = ProcedureTable::new()
        .with(Procedure::new("add", &[ArgKind::Int, ArgKind::Int]).receiver("worker"))
        .with(Procedure::new("total", &[ArgKind::Int]).receiver("main"));

    let config = match Config::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{}", error);
            return;
        }
    };

    let (to_worker, to_main) = transport::pair();
    let worker_table = table.clone();

    let worker = std::thread::spawn(move || {
        let endpoint = Endpoint::compile(worker_table, "worker").expect("table compiles");
        let mut exchange = BufferExchange::new(to_main, config, Identity::Adopt);
        let total = endpoint.writer("total").expect("total is writable");

        let mut accumulator = 0i32;
        let mut rounds = 0;
        while rounds < ROUNDS {
            exchange.receive().expect("pump");
            let Some(delivery) = exchange.recv() else {
                std::thread::yield_now();
                continue;
            };

            endpoint
                .read_batch(
                    exchange.read_region_mut(delivery.slot).expect("a received region"),
                    &mut |call: Call<'_>| {
                        accumulator += call.int(0).unwrap() + call.int(1).unwrap();
                    },
                )
                .expect("well-formed batch");
            exchange.release(delivery.slot).expect("release");

            let slot = loop {
                match exchange.get_write_buffer() {
                    Some(slot) => break slot,
                    None => {
                        exchange.receive().expect("pump");
                        std::thread::yield_now();
                    }
                }
            };
            endpoint
                .write_batch(exchange.write_region(slot).expect("a reserved region"))
                .expect("bind batch")
                .invoke(total, &[Value::Int(accumulator)])
                .expect("encode");
            exchange.release(slot).expect("release");
            rounds += 1;
        }
    });

    let endpoint = Endpoint::compile(table, "main").expect("table compiles");
    let mut exchange = BufferExchange::new(to_worker, config, Identity::Assign);

    let transferred = Rc::new(Cell::new(0u64));
    let counter = Rc::clone(&transferred);
    exchange.set_logger(bex::logging::Logger::new(
        Instant::now(),
        Box::new(move |_, batch: &[(_, ExchangeEvent)]| {
            for (_, event) in batch {
                if let ExchangeEvent::Message(message) = event {
                    counter.set(counter.get() + message.length as u64);
                }
            }
        }),
    ));
    let add = endpoint.writer("add").expect("add is writable");

    let mut last_total = 0;
    for _ in 0..ROUNDS {
        let slot = loop {
            match exchange.get_write_buffer() {
                Some(slot) => break slot,
                None => {
                    exchange.receive().expect("pump");
                    std::thread::yield_now();
                }
            }
        };
        endpoint
            .write_batch(exchange.write_region(slot).expect("a reserved region"))
            .expect("bind batch")
            .invoke(add, &[Value::Int(12), Value::Int(11)])
            .expect("encode");
        exchange.release(slot).expect("release");

        let delivery = loop {
            exchange.receive().expect("pump");
            match exchange.recv() {
                Some(delivery) => break delivery,
                None => std::thread::yield_now(),
            }
        };
        endpoint
            .read_batch(
                exchange.read_region_mut(delivery.slot).expect("a received region"),
                &mut |call: Call<'_>| {
                    last_total = call.int(0).unwrap();
                },
            )
            .expect("well-formed batch");
        exchange.release(delivery.slot).expect("release");
    }

    worker.join().expect("worker exits");
    drop(exchange); // flushes the logger
    println!("worker accumulated {}", last_total);
    println!("moved {} payload bytes through the pair", transferred.get());
    assert_eq!(last_total, (ROUNDS as i32) * 23);
}
