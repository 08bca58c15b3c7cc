use std::sync::Arc;
use std::time::Instant;
use waitq::WaitQueue;

// Will measure round trip time (RTT) of a single `enqueue` call. The producer records the time from
// the moment it hands over the item until the consumer has completed it and the producer has been
// woken up again.

const CAPACITY: usize = 1024;
const NUM_MESSAGES: usize = 1_000_000;
const POISON: u64 = u64::MAX;

fn main() -> anyhow::Result<()> {
    let queue = Arc::new(WaitQueue::<u64>::new(CAPACITY)?);

    let consumer = {
        let queue = queue.clone();
        std::thread::spawn(move || {
            loop {
                let (value, completion) = queue.dequeue();
                completion.complete();

                #[cold]
                #[inline(never)]
                fn poison() {}

                if value == POISON {
                    poison();
                    break;
                }
            }
        })
    };

    let producer = std::thread::spawn(move || -> anyhow::Result<()> {
        let mut latencies = hdrhistogram::Histogram::<u64>::new(3)?;

        for i in 0..NUM_MESSAGES as u64 {
            let start = Instant::now();
            queue.enqueue(i);
            latencies.record(start.elapsed().as_nanos() as u64)?;
        }
        queue.enqueue(POISON);

        println!("######################");
        println!("latencies");
        println!("######################");
        println!("min: {}", latencies.min());
        println!("50th: {}", latencies.value_at_percentile(50.0));
        println!("90th: {}", latencies.value_at_percentile(90.0));
        println!("99th: {}", latencies.value_at_percentile(99.0));
        println!("99.9th: {}", latencies.value_at_percentile(99.9));
        println!("99.99th: {}", latencies.value_at_percentile(99.99));
        println!("max: {}", latencies.max());
        println!("count: {}", latencies.len());
        Ok(())
    });

    producer.join().unwrap()?;
    consumer.join().unwrap();

    Ok(())
}
