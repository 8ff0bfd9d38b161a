use clap::Parser;
use log::error;
use std::process::ExitCode;

use mot2coco::exp::PRESET_NAMES;
use mot2coco::{Error, ExpArgs, Experiment};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = ExpArgs::parse();

    if args.list {
        for name in PRESET_NAMES {
            println!("{}", name);
        }
        return ExitCode::SUCCESS;
    }

    let Some(name) = args.name.as_deref() else {
        error!("No experiment name given");
        return ExitCode::FAILURE;
    };
    let rendered = Experiment::preset(name)
        .and_then(|exp| serde_json::to_string_pretty(&exp).map_err(Error::from));
    match rendered {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
