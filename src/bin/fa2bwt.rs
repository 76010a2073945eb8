use std::path::PathBuf;
use std::time::Instant;
use std::{env, process};

use sgraph::bwt;
use sgraph::sequence;
use sgraph::suffix_array::SuffixArray;
use sgraph::utils;

use getopts::Options;

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new();

    // Check if the output already exists.
    if utils::file_exists(&config.bwt_file) {
        if config.overwrite {
            eprintln!("Overwriting {}", config.bwt_file.display());
        } else {
            return Err(format!("Output file {} already exists", config.bwt_file.display()));
        }
    }

    // Read the input.
    let reader = utils::open_file(&config.fasta_file)?;
    let sequences = sequence::read_fasta(reader)?;
    if sequences.is_empty() {
        return Err(format!("No reads in {}", config.fasta_file.display()));
    }
    eprintln!("Read {} reads", sequences.len());

    // Build the suffix array and write the transform.
    let sa = SuffixArray::build(&sequences);
    eprintln!("Sorted {} suffixes", sa.len());
    let runs = bwt::write_bwt_file(&config.bwt_file, &sa, &sequences)?;
    eprintln!("Wrote {} runs to {}", runs, config.bwt_file.display());
    let size = utils::file_size(&config.bwt_file).unwrap_or(String::from("unknown"));
    eprintln!("Final file size: {}", size);

    let end_time = Instant::now();
    let seconds = end_time.duration_since(start_time).as_secs_f64();
    eprintln!("Used {:.3} seconds", seconds);

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub fasta_file: PathBuf,
    pub bwt_file: PathBuf,
    pub overwrite: bool,
}

impl Config {
    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt("o", "output", "output file name (default: <input>.bwt)", "FILE");
        opts.optflag("", "overwrite", "overwrite the output file if it exists");
        let matches = match opts.parse(&args[1..]) {
            Ok(m) => m,
            Err(f) => {
                eprintln!("{}", f);
                process::exit(1);
            }
        };

        let header = format!("Usage: {} [options] reads.fa[.gz]", program);
        if matches.opt_present("h") {
            eprint!("{}", opts.usage(&header));
            process::exit(0);
        }

        let fasta_file = if let Some(s) = matches.free.first() {
            PathBuf::from(s)
        } else {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        };

        let bwt_file = match matches.opt_str("o") {
            Some(s) => PathBuf::from(s),
            None => PathBuf::from(format!("{}.bwt", fasta_file.display())),
        };
        let overwrite = matches.opt_present("overwrite");

        Config { fasta_file, bwt_file, overwrite }
    }
}

//-----------------------------------------------------------------------------
