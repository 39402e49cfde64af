//! letter – command-line renderer for letter definitions.
//!
//! Usage:
//!   letter <letter.json> [output.pdf] [--dump-canvas]
//!   letter --sample <basic|long|alignment|table> [output.pdf] [--dump-canvas]
//!
//! If `output.pdf` is omitted the PDF is written next to the input file, named
//! after the letter's `file_name`. Relative image paths in the definition
//! resolve against the input file's directory.

use std::{env, fs, path::PathBuf, process};

use gc_letters::config::LetterDefinition;
use gc_letters::images::SourceLoader;
use gc_letters::pipeline::Letter;
use gc_letters::templates::{sample, SAMPLE_NAMES};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut sample_name: Option<String> = None;
    let mut dump_canvas = false;
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--dump-canvas" | "-d" => dump_canvas = true,
            "--sample" | "-s" => match iter.next() {
                Some(v) => sample_name = Some(v.clone()),
                None => {
                    eprintln!("Error: --sample needs a name ({}).", SAMPLE_NAMES.join(", "));
                    process::exit(1);
                }
            },
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                // With --sample the only positional argument is the output.
                if positional == 0 && sample_name.is_none() {
                    input_path = Some(PathBuf::from(path));
                } else if output_path.is_none() {
                    output_path = Some(PathBuf::from(path));
                } else {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                positional += 1;
            }
        }
    }

    let (definition, base_dir) = match (&sample_name, &input_path) {
        (Some(name), _) => match sample(name) {
            Some(def) => (def, PathBuf::from(".")),
            None => {
                eprintln!("Error: unknown sample '{name}' (expected one of {}).", SAMPLE_NAMES.join(", "));
                process::exit(1);
            }
        },
        (None, Some(input)) => {
            let json = match fs::read_to_string(input) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error reading '{}': {e}", input.display());
                    process::exit(1);
                }
            };
            let def = match LetterDefinition::from_json(&json) {
                Ok(d) => d,
                Err(e) => {
                    eprintln!("Error parsing '{}': {e}", input.display());
                    process::exit(1);
                }
            };
            let dir = input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            (def, dir)
        }
        (None, None) => {
            eprintln!("Error: no input file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    let mut letter = Letter::from_definition(definition).with_loader(SourceLoader::with_base_dir(&base_dir));
    let rendered = match letter.render() {
        Ok(Some(r)) => r,
        Ok(None) => {
            eprintln!("Error: letter was already rendered.");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error rendering letter: {e}");
            process::exit(1);
        }
    };

    if dump_canvas {
        println!("{}", rendered.canvas().to_json());
    }

    for warning in rendered.warnings() {
        eprintln!("warning: {warning}");
    }

    let written = match &output_path {
        Some(path) => {
            let bytes = rendered.to_pdf_bytes();
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    if let Err(e) = fs::create_dir_all(parent) {
                        eprintln!("Error creating output directory: {e}");
                        process::exit(1);
                    }
                }
            }
            if let Err(e) = fs::write(path, &bytes) {
                eprintln!("Error writing '{}': {e}", path.display());
                process::exit(1);
            }
            path.clone()
        }
        None => match rendered.save(&base_dir) {
            Ok(path) => path,
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        },
    };

    let pages = rendered.page_count();
    log::info!("Rendered {} with {} warning(s)", written.display(), rendered.warnings().len());
    eprintln!(
        "Wrote '{}' ({} page{})",
        written.display(),
        pages,
        if pages == 1 { "" } else { "s" }
    );
}

fn print_usage(prog: &str) {
    eprintln!("letter – markdown letters to paginated PDF (gc-letters)");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <letter.json> [output.pdf] [--dump-canvas]");
    eprintln!("  {prog} --sample <name> [output.pdf] [--dump-canvas]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <letter.json>  Letter definition: {{\"config\": {{...}}, \"blocks\": [...]}}");
    eprintln!("  [output.pdf]   Output path  (default: <file_name>.pdf next to the input)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --sample, -s       Render a built-in sample ({})", SAMPLE_NAMES.join(", "));
    eprintln!("  --dump-canvas, -d  Print the recorded canvas as JSON on stdout");
    eprintln!("  --help             Print this message");
}
