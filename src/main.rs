//! CLI for citelink - Turn numeric citation markers in Markdown into reference links.

use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use log::{info, warn};

use citelink::{
    build_document, fill_template, generate_output, is_html_output, load_refs,
    patch_undefined_anchors_with_class, render_document, BuildContext, Config, Page,
};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Turn numeric citation markers in Markdown into reference links
#[derive(Parser)]
#[command(name = "citelink")]
#[command(version)]
#[command(after_help = "\
Examples:
  citelink render post.md -o post.html
  citelink render post.md --refs refs.json --no-refs
  citelink build blog/sources/survey.md --template blog/template.html
  echo 'see [1-3]' | citelink render -
  citelink patch _site/index.html -o _site/index.html")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a Markdown file whose references live in front matter
    #[command(after_help = "\
Examples:
  citelink render post.md
  citelink render post.md -r refs.json -o post.html
  citelink render post.md --no-refs

Citation syntax: [1], [1,2,3], [1-4], [1,3-5]")]
    Render {
        /// Input Markdown file (use '-' for stdin)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Extra references: a JSON object {"1": "url"} or '[N]: url' lines
        #[arg(short, long)]
        refs: Option<PathBuf>,

        /// Don't append the reference list
        #[arg(long)]
        no_refs: bool,

        /// Configuration file (default: ./citelink.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Build a standalone HTML page from a Markdown file with '[N]: url' definitions
    #[command(after_help = "\
Examples:
  citelink build survey.md --template template.html
  citelink build survey.md -t template.html -o public/survey.html

Template placeholders: {{title}}, {{description}}, {{date}}, {{tags}},
{{content}}, {{references}}, {{cache_buster}}")]
    Build {
        /// Input Markdown file
        input: PathBuf,

        /// HTML template with {{...}} placeholders
        #[arg(short, long)]
        template: PathBuf,

        /// Output file (default: input path with an .html extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (default: ./citelink.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Fix '<a href="undefined">N</a>' citation anchors in rendered HTML
    Patch {
        /// Input HTML file (use '-' for stdin)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Patch even when the file does not look like an HTML document
        #[arg(long)]
        force: bool,

        /// Configuration file (default: ./citelink.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// AppError: semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 10: input file not found / unreadable
    InputFile(String),
    /// Exit 11: references file not found / invalid
    RefsFile(String),
    /// Exit 12: configuration file unreadable / invalid
    Config(String),
    /// Exit 13: template file not found / unreadable
    Template(String),
    /// Exit 14: front matter is not valid YAML
    FrontMatter(String),
    /// Exit 15: cannot write output file
    OutputFile(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::InputFile(_) => 10,
            AppError::RefsFile(_) => 11,
            AppError::Config(_) => 12,
            AppError::Template(_) => 13,
            AppError::FrontMatter(_) => 14,
            AppError::OutputFile(_) => 15,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InputFile(msg) => {
                write!(f, "{}\n  hint: verify the file path is correct", msg)
            }
            AppError::RefsFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: the file must be a JSON object like {{\"1\": \"https://...\"}}, or '[N]: url' lines",
                    msg
                )
            }
            AppError::Config(msg) => {
                write!(
                    f,
                    "{}\n  hint: known tables are [markdown], [citations] and [references]",
                    msg
                )
            }
            AppError::Template(msg) => {
                write!(f, "{}\n  hint: verify the template path is correct", msg)
            }
            AppError::FrontMatter(msg) => {
                write!(
                    f,
                    "{}\n  hint: front matter is the YAML between the leading '---' lines; reference keys must be numbers",
                    msg
                )
            }
            AppError::OutputFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: check that the output directory exists and is writable",
                    msg
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            output,
            refs,
            no_refs,
            config,
        } => {
            render_command(
                &input,
                output.as_deref(),
                refs.as_deref(),
                no_refs,
                config.as_deref(),
            )?;
        }
        Commands::Build {
            input,
            template,
            output,
            config,
        } => {
            build_command(&input, &template, output.as_deref(), config.as_deref())?;
        }
        Commands::Patch {
            input,
            output,
            force,
            config,
        } => {
            patch_command(&input, output.as_deref(), force, config.as_deref())?;
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Render a Markdown file with front matter references.
fn render_command(
    input: &Path,
    output: Option<&Path>,
    refs: Option<&Path>,
    no_refs: bool,
    config: Option<&Path>,
) -> Result<(), AppError> {
    // 1. Read the Markdown file (support '-' for stdin)
    let source = read_input(input)?;

    // 2. Load configuration and extra references
    let ctx = BuildContext::new(load_config(config)?);
    let extra = refs
        .map(|path| {
            load_refs(path).map_err(|e| AppError::RefsFile(format!("'{}': {}", path.display(), e)))
        })
        .transpose()?;

    // 3. Render body and reference list
    let doc = render_document(&source, extra.as_ref(), &ctx)
        .map_err(|e| AppError::FrontMatter(format!("'{}': {}", input.display(), e)))?;

    // 4. Join them, patching when the target is an HTML document
    let references = if no_refs {
        None
    } else {
        Some(doc.references_html.as_str())
    };
    let mut result = generate_output(&doc.content, references);
    if output.map_or(false, is_html_output) {
        result = patch_undefined_anchors_with_class(&result, &ctx.config().citations.class);
    }

    // 5. Write to file or stdout
    write_output(output, &result)?;
    if let Some(output_path) = output {
        eprintln!(
            "processed {} citation(s), wrote {}",
            doc.citations.len(),
            output_path.display()
        );
    }

    Ok(())
}

/// Build a standalone page from a Markdown file and a template.
fn build_command(
    input: &Path,
    template: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
) -> Result<(), AppError> {
    let source = fs::read_to_string(input)
        .map_err(|e| AppError::InputFile(format!("'{}': {}", input.display(), e)))?;
    let template_html = fs::read_to_string(template)
        .map_err(|e| AppError::Template(format!("'{}': {}", template.display(), e)))?;

    let ctx =
        BuildContext::new(load_config(config)?).with_cache_buster_seed(template_html.as_bytes());

    info!("converting {}", input.display());
    let doc = build_document(&source, &ctx)
        .map_err(|e| AppError::FrontMatter(format!("'{}': {}", input.display(), e)))?;

    let page = Page {
        front_matter: &doc.front_matter,
        content: &doc.content,
        references: &doc.references_html,
        cache_buster: ctx.cache_buster(),
    };
    let mut html = fill_template(&template_html, &page);

    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension("html"));
    if is_html_output(&output_path) {
        html = patch_undefined_anchors_with_class(&html, &ctx.config().citations.class);
    }

    write_output(Some(&output_path), &html)?;
    eprintln!(
        "processed {} citation(s), wrote {}",
        doc.citations.len(),
        output_path.display()
    );

    Ok(())
}

/// Patch undefined citation anchors in a rendered HTML file.
fn patch_command(
    input: &Path,
    output: Option<&Path>,
    force: bool,
    config: Option<&Path>,
) -> Result<(), AppError> {
    let html = read_input(input)?;
    let config = load_config(config)?;

    let target = output.unwrap_or(input);
    let result = if force || is_html_output(target) {
        patch_undefined_anchors_with_class(&html, &config.citations.class)
    } else {
        warn!(
            "'{}' is not an HTML document, leaving it unchanged (use --force to patch anyway)",
            target.display()
        );
        html
    };

    write_output(output, &result)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_input(input: &Path) -> Result<String, AppError> {
    if input == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| AppError::InputFile(format!("failed to read from stdin: {}", e)))?;
        Ok(buf)
    } else {
        fs::read_to_string(input)
            .map_err(|e| AppError::InputFile(format!("'{}': {}", input.display(), e)))
    }
}

fn load_config(path: Option<&Path>) -> Result<Config, AppError> {
    match path {
        Some(path) => Config::load(path)
            .map_err(|e| AppError::Config(format!("'{}': {}", path.display(), e))),
        None => Config::discover(Path::new("."))
            .map_err(|e| AppError::Config(format!("'citelink.toml': {}", e))),
    }
}

fn write_output(output: Option<&Path>, content: &str) -> Result<(), AppError> {
    if let Some(output_path) = output {
        fs::write(output_path, content).map_err(|e| {
            AppError::OutputFile(format!("'{}': {}", output_path.display(), e))
        })
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        write!(handle, "{}", content).map_err(|e| AppError::OutputFile(format!("stdout: {}", e)))
    }
}
