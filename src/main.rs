use warbler::{Config, run};

fn main() -> anyhow::Result<()> {
    // Runtime sizing must be known before the runtime exists.
    let worker_threads = Config::load()?.general.worker_threads;

    let mut runtime = tokio::runtime::Builder::new_multi_thread();
    runtime.enable_all();
    if worker_threads > 0 {
        runtime.worker_threads(worker_threads);
    }

    runtime.build()?.block_on(run())
}
