use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::PathBuf;

use chapterize::Chapterize;
use chapterize::assemble::{self, ConvertProgress};
use chapterize::chapter_encoder::ChapterEncoder;
use chapterize::ffmeta_encoder::FfmetaEncoder;
use chapterize::housekeeping::{clean_up, validate_inputs};
use chapterize::json_array_encoder::JsonArrayEncoder;
use chapterize::logging;
use chapterize::opts::Opts;
use chapterize::output_type::OutputType;
use chapterize::report::format_timestamp_mmss;
use chapterize::resolve::Segmentation;
use chapterize::titles::TitleList;

fn main() -> Result<()> {
    logging::init();
    let params = get_params()?;
    let opts = params.opts();

    let (work_dir, cover) = validate_inputs(&params.audiobook)?;

    // Missing title list is not an error; chapters fall back to bare numbers.
    let titles = if opts.use_titles && opts.titles_path.is_file() {
        TitleList::load(&opts.titles_path)
            .with_context(|| format!("failed to read title list: {}", opts.titles_path.display()))?
    } else {
        TitleList::empty()
    };

    let engine = Chapterize::new(&opts)?;
    let segmentation = engine.segment(&params.audiobook, &titles)?;

    if params.plan {
        write_plan(&segmentation, params.output_type, io::stdout().lock())?;
        if !segmentation.anomalies.is_empty() {
            eprint!("{}", segmentation.anomalies);
        }
        return Ok(());
    }

    if !segmentation.anomalies.is_empty() {
        println!("\n Some structural keywords were heard in unexpected places:");
        print!("{}", segmentation.anomalies);
        pause_for_review(&params)?;
    }

    engine.extract(&params.audiobook, &segmentation)?;
    match segmentation.chapters.last() {
        Some(last) => println!(
            "\n Chapters 1 through {} have been extracted successfully.",
            last.number
        ),
        None => println!("\n No chapter markers found; converting as a single file."),
    }

    let book = work_dir
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("audiobook")
        .to_owned();

    println!("\n Converting '{book}'...");
    let bar = conversion_bar();
    assemble::assemble(&work_dir, &opts.author, &cover, |progress| {
        render_progress(&bar, progress);
    })
    .with_context(|| format!("failed to assemble '{book}'"))?;
    bar.finish_and_clear();

    if opts.keep_workdir {
        println!("\n Working files kept in '{}'.", work_dir.display());
    } else {
        let titles_path = opts.use_titles.then_some(opts.titles_path.as_path());
        let archive = clean_up(&work_dir, &params.audiobook, titles_path)?;
        println!("\n Originals archived to '{}'.", archive.display());
    }

    println!("\n Completed conversion for '{book}'.");
    Ok(())
}

/// Stream the resolved chapters to `writer` in the requested format.
fn write_plan(
    segmentation: &Segmentation,
    output_type: OutputType,
    writer: impl Write,
) -> Result<()> {
    let writer = BufWriter::new(writer);

    let mut encoder: Box<dyn ChapterEncoder> = match output_type {
        OutputType::Json => Box::new(JsonArrayEncoder::new(writer)),
        OutputType::Ffmeta => Box::new(FfmetaEncoder::new(writer)),
    };

    for chapter in &segmentation.chapters {
        encoder.write_chapter(&chapter.meta())?;
    }
    encoder.close()?;
    Ok(())
}

/// Wait for the operator to acknowledge the anomaly report.
///
/// Skipped with `--yes` and when stdin is not a terminal, so scripted runs
/// never hang on the prompt.
fn pause_for_review(params: &Params) -> Result<()> {
    if params.yes || !io::stdin().is_terminal() {
        return Ok(());
    }

    print!("\n Press Enter to continue...");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(())
}

fn conversion_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {percent:>3}% {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    bar
}

fn render_progress(bar: &ProgressBar, progress: &ConvertProgress) {
    bar.set_position(progress.percent.round() as u64);
    bar.set_message(progress_message(progress));
}

fn progress_message(progress: &ConvertProgress) -> String {
    let mut message = format!(
        "{} [{}/{}]",
        progress.label, progress.index, progress.total
    );
    if let Some(eta) = progress.eta {
        message.push_str(&format!(
            " eta {}",
            format_timestamp_mmss(eta.as_secs_f32())
        ));
    }
    message
}

#[derive(Parser, Debug)]
#[command(name = "chapterize")]
#[command(about = "Convert a narrated audiobook file into a chaptered m4b")]
struct Params {
    /// Path to the audiobook file (mp3).
    pub audiobook: PathBuf,

    /// Author name written into the audiobook's tags.
    pub author: String,

    /// Ignore the title list and label chapters by number only.
    #[arg(long = "no-titles", default_value_t = false)]
    pub no_titles: bool,

    /// Chapter title list, one title per line.
    #[arg(long = "titles-file", default_value = "chapter_titles.txt")]
    pub titles_file: PathBuf,

    /// Whisper model size used for transcription.
    #[arg(short = 'm', long = "model", default_value = "base")]
    pub model: String,

    /// Whisper executable to invoke.
    #[arg(long = "whisper-bin", default_value = "whisper")]
    pub whisper_bin: String,

    /// Spoken-language hint passed to the transcriber.
    #[arg(short = 'l', long = "language")]
    pub language: Option<String>,

    /// Print the chapter plan to stdout and exit without touching the audio.
    #[arg(long = "plan", default_value_t = false)]
    pub plan: bool,

    /// Format for --plan output.
    #[arg(
        short = 'o',
        long = "output-type",
        value_enum,
        default_value_t = OutputType::Ffmeta
    )]
    pub output_type: OutputType,

    /// Continue past the anomaly report without waiting for confirmation.
    #[arg(short = 'y', long = "yes", default_value_t = false)]
    pub yes: bool,

    /// Leave the working directory in place instead of archiving it.
    #[arg(long = "keep-workdir", default_value_t = false)]
    pub keep_workdir: bool,
}

impl Params {
    fn opts(&self) -> Opts {
        Opts {
            author: self.author.clone(),
            use_titles: !self.no_titles,
            titles_path: self.titles_file.clone(),
            model: self.model.clone(),
            program: self.whisper_bin.clone(),
            language: self.language.clone(),
            keep_workdir: self.keep_workdir,
        }
    }
}

fn get_params() -> Result<Params> {
    Ok(Params::parse())
}
