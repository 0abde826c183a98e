use std::process::ExitCode;

use clap::Parser;

use width_fonts::Args;

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(if args.quiet { log::LevelFilter::Warn } else { log::LevelFilter::Info })
        .format_timestamp(None)
        .format_target(false)
        .init();

    match width_fonts::run(&args) {
        Ok(new_font_id) => {
            log::debug!("Wrote \"{new_font_id}\"");
            if !args.quiet {
                println!("Done!");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
