//! End-to-end tests driving both halves together.

use bex::{
    transport, ArgKind, BatchWriter, BufferExchange, Call, Caller, CodecError, Config, Dispatch,
    Endpoint, Identity, Procedure, ProcedureTable, State, Value,
};

fn sides(table: ProcedureTable, count: usize) -> (
    Endpoint,
    Endpoint,
    BufferExchange<transport::ProcessTransport>,
    BufferExchange<transport::ProcessTransport>,
) {
    let main_side = Endpoint::compile(table.clone(), "main").expect("table compiles");
    let worker_side = Endpoint::compile(table, "worker").expect("table compiles");
    let (to_worker, to_main) = transport::pair();
    let config = Config::new(main_side.required_buffer_size(), count);
    let main = BufferExchange::new(to_worker, config, Identity::Assign);
    let worker = BufferExchange::new(to_main, config, Identity::Adopt);
    (main_side, worker_side, main, worker)
}

/// The write-side wrapper pattern: each procedure as a direct method.
struct Arithmetic<'a, 'b> {
    batch: &'a mut BatchWriter<'b>,
    add: Caller,
}

impl Arithmetic<'_, '_> {
    fn add(&mut self, a: i32, b: i32) -> Result<(), CodecError> {
        self.batch.invoke(self.add, &[a.into(), b.into()])
    }
}

#[test]
fn simple_round_trip_accumulates() {
    let table = ProcedureTable::new()
        .with(Procedure::new("add", &[ArgKind::Int, ArgKind::Int]).receiver("worker"));
    let (main_side, worker_side, mut main, mut worker) = sides(table, 2);
    let add = main_side.writer("add").unwrap();

    let slot = main.get_write_buffer().unwrap();
    {
        let mut batch = main_side.write_batch(main.write_region(slot).unwrap()).unwrap();
        let mut calls = Arithmetic { batch: &mut batch, add };
        for _ in 0..1000 {
            calls.add(12, 11).unwrap();
        }
    }
    main.release(slot).unwrap();

    worker.receive().unwrap();
    let delivery = worker.recv().expect("one batch");
    let mut accumulator = 0i64;
    let drained = worker_side
        .read_batch(worker.read_region_mut(delivery.slot).unwrap(), &mut |call: Call<'_>| {
            accumulator += (call.int(0).unwrap() + call.int(1).unwrap()) as i64;
        })
        .unwrap();
    worker.release(delivery.slot).unwrap();

    assert_eq!(drained, 1000);
    assert_eq!(accumulator, 23_000);
}

#[test]
fn mixed_argument_kinds_round_trip() {
    let table = ProcedureTable::new().with(
        Procedure::new("config", &[ArgKind::Str, ArgKind::Int, ArgKind::Float])
            .receiver("worker"),
    );
    let (main_side, worker_side, mut main, mut worker) = sides(table, 2);
    let config = main_side.writer("config").unwrap();

    let slot = main.get_write_buffer().unwrap();
    main_side
        .write_batch(main.write_region(slot).unwrap())
        .unwrap()
        .invoke(config, &[Value::Str("hi".into()), Value::Int(-7), Value::Float(1.5)])
        .unwrap();
    main.release(slot).unwrap();

    worker.receive().unwrap();
    let delivery = worker.recv().unwrap();
    let mut record = None;
    worker_side
        .read_batch(worker.read_region_mut(delivery.slot).unwrap(), &mut |call: Call<'_>| {
            record = Some((
                call.str(0).unwrap().to_owned(),
                call.int(1).unwrap(),
                call.float(2).unwrap(),
            ));
        })
        .unwrap();

    let (text, int, float) = record.expect("one call");
    assert_eq!(text, "hi");
    assert_eq!(int, -7);
    assert!((float - 1.5).abs() < f32::EPSILON);
}

struct Entity {
    ticks: Vec<i32>,
}

impl Dispatch for Entity {
    fn call(&mut self, call: Call<'_>) {
        self.ticks.push(call.int(0).unwrap());
    }
}

struct World {
    ents: Vec<Entity>,
}

impl Dispatch for World {
    fn call(&mut self, _call: Call<'_>) {}

    fn instance(&mut self, registry: &str, id: u32) -> Option<&mut dyn Dispatch> {
        match registry {
            "ents" => self.ents.get_mut(id as usize).map(|e| e as &mut dyn Dispatch),
            _ => None,
        }
    }
}

#[test]
fn instance_dispatch_routes_by_registry() {
    let table = ProcedureTable::new()
        .with(Procedure::new("tick", &[ArgKind::Int]).receiver("worker").instanced("ents"));
    let (main_side, worker_side, mut main, mut worker) = sides(table, 2);
    let tick = main_side.writer("ents.tick").unwrap();

    let slot = main.get_write_buffer().unwrap();
    {
        let mut batch = main_side.write_batch(main.write_region(slot).unwrap()).unwrap();
        batch.invoke_instanced(tick, 0, &[Value::Int(3)]).unwrap();
        batch.invoke_instanced(tick, 2, &[Value::Int(5)]).unwrap();
    }
    main.release(slot).unwrap();

    worker.receive().unwrap();
    let delivery = worker.recv().unwrap();
    let mut world = World {
        ents: (0..3).map(|_| Entity { ticks: Vec::new() }).collect(),
    };
    worker_side
        .read_batch(worker.read_region_mut(delivery.slot).unwrap(), &mut world)
        .unwrap();

    assert_eq!(world.ents[0].ticks, [3]);
    assert!(world.ents[1].ticks.is_empty());
    assert_eq!(world.ents[2].ticks, [5]);
}

#[test]
fn batches_dispatch_in_send_order() {
    let table = ProcedureTable::new()
        .with(Procedure::new("mark", &[ArgKind::Int]).receiver("worker"));
    let (main_side, worker_side, mut main, mut worker) = sides(table, 2);
    let mark = main_side.writer("mark").unwrap();

    // Two batches posted back to back before the worker pumps at all.
    let mut next = 1;
    for _ in 0..2 {
        let slot = main.get_write_buffer().unwrap();
        let mut batch = main_side.write_batch(main.write_region(slot).unwrap()).unwrap();
        for _ in 0..3 {
            batch.invoke(mark, &[Value::Int(next)]).unwrap();
            next += 1;
        }
        drop(batch);
        main.release(slot).unwrap();
    }

    worker.receive().unwrap();
    let mut seen = Vec::new();
    while let Some(delivery) = worker.recv() {
        worker_side
            .read_batch(worker.read_region_mut(delivery.slot).unwrap(), &mut |call: Call<'_>| {
                seen.push(call.int(0).unwrap());
            })
            .unwrap();
        worker.release(delivery.slot).unwrap();
    }
    assert_eq!(seen, [1, 2, 3, 4, 5, 6]);
}

#[test]
fn interleaved_ping_pong_restores_accounting() {
    const ROUNDS: u32 = 100;

    let table = ProcedureTable::new()
        .with(Procedure::new("ping", &[ArgKind::Int]).receiver("worker"))
        .with(Procedure::new("pong", &[ArgKind::Int]).receiver("main"));
    let buffer_count = 2;

    let (to_worker, to_main) = transport::pair();
    let worker_table = table.clone();

    let worker_thread = std::thread::spawn(move || {
        let endpoint = Endpoint::compile(worker_table, "worker").expect("table compiles");
        let config = Config::new(endpoint.required_buffer_size(), buffer_count);
        let mut exchange = BufferExchange::new(to_main, config, Identity::Adopt);
        let pong = endpoint.writer("pong").unwrap();

        let mut rounds = 0;
        let mut spins = 0u64;
        while rounds < ROUNDS {
            exchange.receive().expect("pump");
            let Some(delivery) = exchange.recv() else {
                spins += 1;
                assert!(spins < 1_000_000_000, "worker starved");
                std::thread::yield_now();
                continue;
            };

            let mut calls = 0;
            endpoint
                .read_batch(exchange.read_region_mut(delivery.slot).unwrap(), &mut |_: Call<'_>| {
                    calls += 1;
                })
                .unwrap();
            exchange.release(delivery.slot).unwrap();

            let slot = exchange.get_write_buffer().expect("a response slot");
            endpoint
                .write_batch(exchange.write_region(slot).unwrap())
                .unwrap()
                .invoke(pong, &[Value::Int(calls)])
                .unwrap();
            exchange.release(slot).unwrap();
            rounds += 1;
        }

        // Quiesced: accounting restored, every slot at rest.
        assert_eq!(exchange.slots_available(), buffer_count);
        for slot in 0..exchange.total_slots() {
            assert!(matches!(
                exchange.slot_state(slot),
                State::Available | State::NotAvailable
            ));
        }
        rounds
    });

    let endpoint = Endpoint::compile(table, "main").expect("table compiles");
    let config = Config::new(endpoint.required_buffer_size(), buffer_count);
    let mut exchange = BufferExchange::new(to_worker, config, Identity::Assign);
    let ping = endpoint.writer("ping").unwrap();

    for round in 0..ROUNDS {
        let calls = (round % 5) + 1;
        let slot = exchange.get_write_buffer().expect("a request slot");
        {
            let mut batch = endpoint.write_batch(exchange.write_region(slot).unwrap()).unwrap();
            for _ in 0..calls {
                batch.invoke(ping, &[Value::Int(round as i32)]).unwrap();
            }
        }
        exchange.release(slot).unwrap();

        // Wait for the echoed call count.
        let mut spins = 0u64;
        let delivery = loop {
            exchange.receive().expect("pump");
            if let Some(delivery) = exchange.recv() {
                break delivery;
            }
            spins += 1;
            assert!(spins < 1_000_000_000, "main starved");
            std::thread::yield_now();
        };

        let mut echoed = None;
        endpoint
            .read_batch(exchange.read_region_mut(delivery.slot).unwrap(), &mut |call: Call<'_>| {
                echoed = Some(call.int(0).unwrap());
            })
            .unwrap();
        exchange.release(delivery.slot).unwrap();
        assert_eq!(echoed, Some(calls as i32));
    }

    assert_eq!(worker_thread.join().expect("worker exits"), ROUNDS);
    assert_eq!(exchange.slots_available(), buffer_count);
    for slot in 0..exchange.total_slots() {
        assert!(matches!(
            exchange.slot_state(slot),
            State::Available | State::NotAvailable
        ));
    }
}
