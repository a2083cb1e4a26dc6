use todo_server::config::{self, Command};
use todo_server::logging::init_logging;
use todo_server::routes::App;
use todo_server::server;
use todo_server::store::Store;
use tracing::{error, info};

fn main() {
    let command = match config::parse_args(std::env::args().skip(1), |key| std::env::var(key).ok()) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("{}\n", err);
            config::print_help();
            std::process::exit(1);
        }
    };
    let config = match command {
        Command::Help => {
            config::print_help();
            return;
        }
        Command::Run(config) => config,
    };

    init_logging();

    let store = match Store::load(&config.data_path) {
        Ok(store) => store,
        Err(err) => {
            error!("{}: {}", config.data_path.display(), err);
            std::process::exit(1);
        }
    };
    info!(
        "Loaded {} task(s) from {}",
        store.tasks().len(),
        store.path().display()
    );

    if let Err(err) = server::run(App::new(store), config.port) {
        error!("Server stopped: {}", err);
        std::process::exit(1);
    }
}
