use baseplate::{
    cli::{Cli, Command, ServeArgs},
    config::{self, Config},
    Baseplate,
};
use clap::Parser as _;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt as _};

fn load_config(args: ServeArgs) -> anyhow::Result<Config> {
    let mut config = Config::load(args.config_path)?;
    if let Some(listen) = args.listen {
        config.listen = listen;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}=debug,baseplate=debug,tower_http=debug",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::ConfigTemplate) => config::print_config_template(),
        Some(Command::ConfigInit { config_path }) => config::init_config(config_path)?,
        Some(Command::Check { args }) => {
            let baseplate = Baseplate::boot(load_config(args)?)?;
            let templates = baseplate.context().composer().templates().ids().count();
            println!("All {templates} layout templates are valid.");
        }
        None => Baseplate::boot(load_config(cli.args)?)?.serve().await?,
    }

    Ok(())
}
