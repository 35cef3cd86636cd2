use std::{num::NonZeroU32, path::PathBuf};

use clap::Parser;
use fake_user_agent::get_chrome_rua;
use kawa::{
    download::{download_variant, DownloadOptions},
    manifest, merge, select, Fetcher, KawaError, Manifest, RetryPolicy, StreamKind,
};
use reqwest::Client;
use url::Url;

#[derive(Parser, Debug, Clone)]
#[clap(name = "kawa", version)]
struct KawaArgs {
    /// Debug output
    #[clap(long, alias = "debug")]
    verbose: bool,

    /// Output file path
    ///
    /// Defaults to a timestamped name generated at startup.
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Print the variant table and exit without downloading
    #[clap(short, long)]
    info: bool,

    /// Download only, do not mux audio and video
    #[clap(long)]
    skip_merge: bool,

    /// Threads limit
    #[clap(short = 'n', long = "threads", default_value = "10")]
    threads: NonZeroU32,

    /// Retry limit per segment
    #[clap(long, default_value = "5")]
    retries: u32,

    /// Cap each variant to its first 100 segments
    #[clap(long)]
    test: bool,

    /// Master manifest url
    url: String,
}

impl KawaArgs {
    fn client(&self) -> Client {
        Client::builder()
            .user_agent(get_chrome_rua())
            .build()
            .unwrap()
    }
}

/// Default output name for this run. Computed once at startup so both phase
/// files and the final output share one prefix.
fn run_prefix() -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let salt = rand::random::<u16>() % 1000;
    format!("{timestamp}-{salt:03}")
}

fn print_variants(manifest: &Manifest) {
    println!("video variants:");
    for summary in select::summaries(&manifest.video) {
        println!("  {summary}");
    }
    if manifest.audio.is_empty() {
        println!("audio variants: none");
    } else {
        println!("audio variants:");
        for summary in select::summaries(&manifest.audio) {
            println!("  {summary}");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = KawaArgs::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let client = args.client();
    let manifest_url = Url::parse(&args.url)?;
    let (manifest, base_url) = manifest::fetch_manifest(&client, &manifest_url).await?;

    let video = select::best(&manifest.video).ok_or(KawaError::NoVariants(StreamKind::Video))?;

    if args.info {
        print_variants(&manifest);
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.mp4", run_prefix())));
    let stem = output.with_extension("");

    let fetcher = Fetcher::new(
        client,
        RetryPolicy::default().with_max_retries(args.retries),
    );
    let options = DownloadOptions {
        concurrency: args.threads,
        simulate: args.info,
        limit: args.test.then_some(100),
    };

    let video_path = StreamKind::Video.phase_output(&stem);
    download_variant(
        &fetcher,
        &base_url,
        video,
        StreamKind::Video,
        &video_path,
        &options,
    )
    .await?;

    let audio_path = match select::best(&manifest.audio) {
        Some(audio) => {
            let path = StreamKind::Audio.phase_output(&stem);
            download_variant(&fetcher, &base_url, audio, StreamKind::Audio, &path, &options)
                .await?;
            Some(path)
        }
        None => None,
    };

    if args.info {
        return Ok(());
    }

    if args.skip_merge {
        tracing::info!("Skipping merge, stream outputs are in place.");
        return Ok(());
    }

    merge::combine(&video_path, audio_path.as_deref(), &output).await?;

    Ok(())
}
