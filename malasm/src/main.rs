use clap::Parser;
use color_print::cformat;

use malasm::output;
use malasm::symbols::SymbolMap;

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(version, about = "Assembler for the MIC-1 Micro-Assembly Language", help_template = HELP_TEMPLATE)]
struct Args {
    /// Input file
    input: Option<String>,

    /// Output format
    #[clap(short, long, value_enum, default_value = "binary")]
    format: Format,

    /// Output file (default a.out for binary, a.txt for text)
    #[clap(short, long)]
    output: Option<String>,

    /// Print the control store listing after assembly
    #[clap(short, long)]
    dump: bool,

    /// Write the label map as JSON
    #[clap(short, long, value_name = "file")]
    symbols: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Format {
    Binary,
    Text,
}

fn main() {
    let args = Args::parse();

    let Some(input) = args.input else {
        fail("no input file");
    };
    let source = match std::fs::read_to_string(&input) {
        Ok(source) => source,
        Err(_) => fail(&format!("no such file: {input}")),
    };

    let program = match malasm::assemble(&source) {
        Ok(program) => program,
        Err(e) => fail(&e.to_string()),
    };

    if args.dump {
        output::print_dump(&program);
    }

    if let Some(path) = &args.symbols {
        let json = match SymbolMap::generate(&program).to_json() {
            Ok(json) => json,
            Err(e) => fail(&e.to_string()),
        };
        if std::fs::write(path, json).is_err() {
            fail(&format!("can't write file: {path}"));
        }
    }

    let out = args.output.unwrap_or_else(|| {
        match args.format {
            Format::Binary => "a.out",
            Format::Text => "a.txt",
        }
        .to_string()
    });
    let written = match args.format {
        Format::Binary => output::write_binary(&program, mic1::STORE_WORDS, &out),
        Format::Text => output::write_text(&program, mic1::STORE_WORDS, &out),
    };
    if written.is_err() {
        fail(&format!("can't write file: {out}"));
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{}", cformat!("<red,bold>malasm:</> {}", message));
    std::process::exit(1);
}
