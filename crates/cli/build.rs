use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("precis")
        .version("1.0.0")
        .author("Precis Contributors")
        .about("Summarize web articles and PDF documents with Gemini")
        .arg(clap::arg!([INPUT] "Article URL (http:// or https://) or path to a PDF file"))
        .arg(clap::arg!(-m --model <MODEL> "Gemini model to use"))
        .arg(clap::arg!(--temperature <TEMP> "Sampling temperature").default_value("0.3"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds for fetching pages").default_value("10"))
        .arg(clap::arg!(--"user-agent" <UA> "Custom User-Agent for HTTP requests").value_name("UA"))
        .arg(
            clap::arg!(--"log-file" <FILE> "Event log file")
                .value_name("FILE")
                .default_value("assistant_log.jsonl")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(--"log-format" <FORMAT> "Event log format (jsonl, json)")
                .value_name("FORMAT")
                .default_value("jsonl")
                .value_parser(["jsonl", "json"]),
        )
        .arg(clap::arg!(--"list-models" "List models that support content generation and exit"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file for the summary (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "precis", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "precis", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "precis", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "precis", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
