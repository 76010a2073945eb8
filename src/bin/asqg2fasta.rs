use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use std::{env, process};

use sgraph::asqg::{self, LoadParams};
use sgraph::bigraph::Bigraph;
use sgraph::visitors::{
    self, ChimericVisitor, ContainRemoveVisitor, FastaVisitor,
    MaximalOverlapVisitor, StatisticsVisitor, TrimVisitor,
};

use getopts::Options;

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new();

    // Load the graph.
    let params = LoadParams {
        min_overlap: config.min_overlap,
        allow_containments: true,
        max_edges: config.max_edges,
    };
    let mut graph = Bigraph::new();
    asqg::load_file(&config.asqg_file, &params, &mut graph)?;
    let mut statistics = StatisticsVisitor::new();
    visitors::apply(&mut graph, &mut statistics);
    eprintln!("Loaded {}", statistics);

    // Remove contained reads. Another round is needed if a pass introduces
    // new containments.
    while graph.containment() {
        let mut contain_remove = ContainRemoveVisitor::new();
        visitors::apply(&mut graph, &mut contain_remove);
        eprintln!("Removed {} contained vertices", contain_remove.contained());
    }

    // Clean up the graph.
    let mut trim = TrimVisitor::new(config.min_length);
    visitors::apply(&mut graph, &mut trim);
    eprintln!("Removed {} islands and {} tips", trim.islands(), trim.terminals());

    let mut chimeric = ChimericVisitor::new(config.min_length, config.delta);
    visitors::apply(&mut graph, &mut chimeric);
    eprintln!("Removed {} chimeric vertices", chimeric.chimeric());

    let mut maximal = MaximalOverlapVisitor::new(config.delta);
    visitors::apply(&mut graph, &mut maximal);
    eprintln!("Removed {} dominated overlaps", maximal.dummies());

    // Merge unbranched paths.
    if config.simplify {
        graph.simplify();
    }
    let mut statistics = StatisticsVisitor::new();
    visitors::apply(&mut graph, &mut statistics);
    eprintln!("Final {}", statistics);

    // Write the unitigs.
    write_output(&mut graph, config.output_file.as_ref())?;

    let end_time = Instant::now();
    let seconds = end_time.duration_since(start_time).as_secs_f64();
    eprintln!("Used {:.3} seconds", seconds);

    Ok(())
}

fn write_output(graph: &mut Bigraph, output_file: Option<&PathBuf>) -> Result<(), String> {
    match output_file {
        Some(filename) => {
            let file = File::create(filename).map_err(|x| x.to_string())?;
            let mut stream = BufWriter::new(file);
            write_fasta(graph, &mut stream)
        }
        None => {
            let stdout = io::stdout();
            let mut stream = stdout.lock();
            write_fasta(graph, &mut stream)
        }
    }
}

fn write_fasta<W: Write>(graph: &mut Bigraph, stream: &mut W) -> Result<(), String> {
    let mut fasta = FastaVisitor::new(stream);
    visitors::apply(graph, &mut fasta);
    fasta.into_result().map_err(|x| x.to_string())?;
    stream.flush().map_err(|x| x.to_string())
}

//-----------------------------------------------------------------------------

struct Config {
    pub asqg_file: PathBuf,
    pub output_file: Option<PathBuf>,
    pub min_overlap: usize,
    pub min_length: usize,
    pub delta: usize,
    pub max_edges: usize,
    pub simplify: bool,
}

impl Config {
    const MIN_OVERLAP: usize = 45;
    const MIN_LENGTH: usize = 200;
    const DELTA: usize = 30;
    const MAX_EDGES: usize = 128;

    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt("m", "min-overlap", &format!("minimum overlap length (default: {})", Self::MIN_OVERLAP), "INT");
        opts.optopt("l", "min-length", &format!("minimum sequence length for trimming (default: {})", Self::MIN_LENGTH), "INT");
        opts.optopt("d", "delta", &format!("overlap length tolerance (default: {})", Self::DELTA), "INT");
        opts.optopt("", "max-edges", &format!("per-vertex edge cap (default: {})", Self::MAX_EDGES), "INT");
        opts.optflag("", "no-simplify", "do not merge unbranched paths");
        opts.optopt("o", "output", "output file name (default: stdout)", "FILE");
        let matches = match opts.parse(&args[1..]) {
            Ok(m) => m,
            Err(f) => {
                eprintln!("{}", f);
                process::exit(1);
            }
        };

        let header = format!("Usage: {} [options] graph.asqg[.gz]", program);
        if matches.opt_present("h") {
            eprint!("{}", opts.usage(&header));
            process::exit(0);
        }

        let asqg_file = if let Some(s) = matches.free.first() {
            PathBuf::from(s)
        } else {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        };

        Config {
            asqg_file,
            output_file: matches.opt_str("o").map(PathBuf::from),
            min_overlap: Self::parse_option(&matches, "min-overlap", Self::MIN_OVERLAP),
            min_length: Self::parse_option(&matches, "min-length", Self::MIN_LENGTH),
            delta: Self::parse_option(&matches, "delta", Self::DELTA),
            max_edges: Self::parse_option(&matches, "max-edges", Self::MAX_EDGES),
            simplify: !matches.opt_present("no-simplify"),
        }
    }

    fn parse_option(matches: &getopts::Matches, name: &str, default: usize) -> usize {
        match matches.opt_str(name) {
            Some(value) => match value.parse::<usize>() {
                Ok(parsed) => parsed,
                Err(f) => {
                    eprintln!("--{}: {}", name, f);
                    process::exit(1);
                }
            },
            None => default,
        }
    }
}

//-----------------------------------------------------------------------------
