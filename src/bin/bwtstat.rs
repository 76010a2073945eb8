use std::path::PathBuf;
use std::time::Instant;
use std::{env, process};

use sgraph::bwt;
use sgraph::fmindex::{FMIndex, DEFAULT_SAMPLE_RATE};
use sgraph::utils;

use getopts::Options;

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new();

    // Load the transform and build the rank index.
    let bwt = bwt::load_bwt_file(&config.bwt_file)?;
    eprintln!("Loaded the BWT of {} reads ({} suffixes)", bwt.num_strings(), bwt.len());
    let index = FMIndex::with_sample_rate(bwt, config.sample_rate);

    eprint!("{}", index.statistics());
    eprintln!("Marker memory: {}", utils::human_readable_size(index.marker_bytes()));
    let size = utils::file_size(&config.bwt_file).unwrap_or(String::from("unknown"));
    eprintln!("File size: {}", size);

    let end_time = Instant::now();
    let seconds = end_time.duration_since(start_time).as_secs_f64();
    eprintln!("Used {:.3} seconds", seconds);

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub bwt_file: PathBuf,
    pub sample_rate: usize,
}

impl Config {
    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt("s", "sample-rate", &format!("marker sample rate (default: {})", DEFAULT_SAMPLE_RATE), "INT");
        let matches = match opts.parse(&args[1..]) {
            Ok(m) => m,
            Err(f) => {
                eprintln!("{}", f);
                process::exit(1);
            }
        };

        let header = format!("Usage: {} [options] reads.bwt", program);
        if matches.opt_present("h") {
            eprint!("{}", opts.usage(&header));
            process::exit(0);
        }

        let bwt_file = if let Some(s) = matches.free.first() {
            PathBuf::from(s)
        } else {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        };

        let sample_rate = match matches.opt_str("s") {
            Some(value) => match value.parse::<usize>() {
                Ok(parsed) => parsed,
                Err(f) => {
                    eprintln!("--sample-rate: {}", f);
                    process::exit(1);
                }
            },
            None => DEFAULT_SAMPLE_RATE,
        };

        Config { bwt_file, sample_rate }
    }
}

//-----------------------------------------------------------------------------
