use std::path::PathBuf;

use daily_hn::RunOptions;

const HELP: &str = "Daily Dose of HN: the best Hacker News stories in your terminal.

  --print,   -p          Print the stories instead of starting the interface
  --browser, -b <CMD>    Command used to open links (default: system browser)
  --config <PATH>        Read configuration from PATH
  --version, -V          Show version and exit
  --help,    -h          Show this help message

Keys: j/k scroll, {/} page, g/G top/bottom, letter shortcuts open a story, q quits.";

enum Cli {
    Run(RunOptions),
    Exit,
}

fn main() {
    let options = match parse_args(std::env::args().skip(1)) {
        Ok(Cli::Run(options)) => options,
        Ok(Cli::Exit) => return,
        Err(message) => {
            eprintln!("error: {message}\n\n{HELP}");
            std::process::exit(2);
        }
    };

    if let Err(err) = daily_hn::run(options) {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Cli, String> {
    let mut options = RunOptions::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("daily-hn {}", daily_hn::VERSION);
                return Ok(Cli::Exit);
            }
            "--help" | "-h" => {
                println!("{HELP}");
                return Ok(Cli::Exit);
            }
            "--print" | "-p" => options.print = true,
            "--browser" | "-b" => {
                let browser = args.next().ok_or("--browser needs a command")?;
                options.browser = Some(browser);
            }
            "--config" => {
                let path = args.next().ok_or("--config needs a path")?;
                options.config_file = Some(PathBuf::from(path));
            }
            other => return Err(format!("unknown argument {other:?}")),
        }
    }
    Ok(Cli::Run(options))
}
