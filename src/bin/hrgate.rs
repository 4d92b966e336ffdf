use hrgate::cli::{self, Command};
use hrgate::HrGateError;

fn main() {
    // Install global collector configured based on HRGATE_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("HRGATE_LOG"))
        .with_target(true)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_thread_ids(true)
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .on_thread_start(|| tracing::trace!("thread start"))
        .on_thread_stop(|| tracing::trace!("thread stop"))
        .enable_io()
        .enable_time()
        .build();

    match runtime {
        Ok(runtime) => runtime.block_on(run()),
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}

async fn run() {
    if let Err(err) = run_inner().await {
        let code = match err {
            HrGateError::Unauthenticated { message } => {
                eprintln!("unauthenticated: {}", message.as_deref().unwrap_or("-"));
                2
            }
            _ => {
                eprintln!("{}", err);
                1
            }
        };
        std::process::exit(code);
    };
}

async fn run_inner() -> hrgate::Result<()> {
    let cli::HrGateCommand { client, command } = cli::parse();

    match command {
        Command::Signin(signin) => signin.run(client.http_client()?).await,
        Command::Employees(employees) => employees.run(client.http_client()?).await,
        Command::Route(route) => route.run().await,
        Command::HashPassword(hash) => hash.run(),
        Command::Server(server) => server.run().await,
    }
}
