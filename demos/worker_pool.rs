use rand::{Rng, thread_rng};
use std::time::{Duration, Instant};
use waitq::WaitQueue;

/// This example will demonstrate a pool of workers fed by several submitters. Each submitter only
/// moves on to its next job once a worker has finished the previous one, so the amount of queued
/// work never exceeds the ring capacity.
///
/// Run with `--features tracing` to see every slot transition.

const CAPACITY: usize = 4;
const SUBMITTERS: usize = 3;
const WORKERS: usize = 2;
const JOBS_PER_SUBMITTER: usize = 5;

struct Job {
    submitter: usize,
    id: usize,
    cost: Duration,
}

fn main() -> anyhow::Result<()> {
    waitq::trace::init_tracing();

    let queue = WaitQueue::<Job>::new(CAPACITY)?;

    std::thread::scope(|s| {
        for submitter in 0..SUBMITTERS {
            let queue = &queue;
            s.spawn(move || {
                for id in 0..JOBS_PER_SUBMITTER {
                    let cost = Duration::from_millis(thread_rng().gen_range(1..20));
                    let start = Instant::now();
                    queue.enqueue(Job { submitter, id, cost });
                    println!("submitter {submitter} job {id} acknowledged after {:?}", start.elapsed());
                }
            });
        }

        for worker in 0..WORKERS {
            let queue = &queue;
            s.spawn(move || {
                // workers split the jobs evenly, the last one picks up the remainder
                let share = SUBMITTERS * JOBS_PER_SUBMITTER / WORKERS;
                let jobs = if worker == WORKERS - 1 {
                    SUBMITTERS * JOBS_PER_SUBMITTER - share * (WORKERS - 1)
                } else {
                    share
                };
                for _ in 0..jobs {
                    let (job, completion) = queue.dequeue();
                    std::thread::sleep(job.cost);
                    println!(
                        "worker {worker} finished submitter {} job {} ({:?}) from slot {}",
                        job.submitter,
                        job.id,
                        job.cost,
                        completion.index()
                    );
                    completion.complete();
                }
            });
        }
    });

    Ok(())
}
