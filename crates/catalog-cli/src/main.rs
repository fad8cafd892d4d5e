use std::path::{Path, PathBuf};

use anyhow::Context;
use catalog_core::domain::{ProductForm, RawFile};
use catalog_core::imaging::target_dimensions;
use catalog_core::view::{image_src, render_products};
use catalog_core::{AppBuilder, CatalogApp, CatalogConfig, CatalogError};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "catalog-cli", version, about = "Product catalog editor")]
struct Cli {
    /// JSON config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render the catalog, adding one product per image file
    Render {
        /// Image file to attach to a new product (repeatable)
        #[arg(long = "add-image")]
        images: Vec<PathBuf>,

        /// Print JSON summaries instead of HTML
        #[arg(long)]
        json: bool,
    },

    /// Downscale one image through the pipeline and write the result
    Thumbnail {
        input: PathBuf,

        #[arg(long)]
        out: PathBuf,

        #[arg(long)]
        max_width: Option<u32>,

        #[arg(long)]
        quality: Option<f32>,
    },

    /// Walk through add / edit / delete and report live handles
    Demo {
        /// Image used for the add step
        first: PathBuf,

        /// Image that replaces it in the edit step
        second: PathBuf,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn read_file(path: &Path) -> Result<RawFile, CatalogError> {
    let bytes = std::fs::read(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(RawFile::new(name, bytes))
}

fn product_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_string())
}

async fn render(app: &mut CatalogApp, images: &[PathBuf], json: bool) -> anyhow::Result<()> {
    for path in images {
        let form = ProductForm::new(product_name(path), "Uploads", "0", "")
            .with_image(read_file(path)?);
        app.store_mut().add(form).await?;
    }

    let records = app.store().records();
    if json {
        let summaries: Vec<_> = records
            .iter()
            .map(|r| r.summary(image_src(&r.image)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        println!("{}", render_products(records));
    }
    Ok(())
}

async fn thumbnail(
    app: &mut CatalogApp,
    input: &Path,
    out: &Path,
    max_width: Option<u32>,
    quality: Option<f32>,
) -> anyhow::Result<()> {
    let file = read_file(input)?;
    let original_len = file.len();
    let pipeline = app.pipeline().clone();
    let config = pipeline.config();
    let max_width = max_width.unwrap_or(config.max_width);
    let quality = quality.unwrap_or(config.quality);

    let handle = pipeline
        .process_with(Some(file), max_width, quality)
        .await
        .context("pipeline returned no handle for a supplied file")?;
    let bytes = app
        .registry()
        .get(&handle)
        .context("handle released before it was read")?;
    std::fs::write(out, &bytes).with_context(|| format!("failed to write {}", out.display()))?;

    match image::load_from_memory(&bytes) {
        Ok(img) => {
            let (w, h) = (img.width(), img.height());
            tracing::info!(%handle, width = w, height = h, original_len, len = bytes.len(), "thumbnail written");
        }
        Err(_) => {
            tracing::warn!(%handle, original_len, "original bytes written unchanged");
        }
    }
    app.registry().release(&handle);
    Ok(())
}

async fn demo(app: &mut CatalogApp, first: &Path, second: &Path) -> anyhow::Result<()> {
    let registry = app.registry().clone();

    let form = ProductForm::new("Demo Lamp", "Home", "25", "A lamp for the demo")
        .with_image(read_file(first)?);
    let index = app.store_mut().add(form).await?;
    println!("added #{index}: live handles = {}", registry.live_count());

    let form = ProductForm::new("Demo Lamp", "Home", "19.99", "Now on sale")
        .with_image(read_file(second)?);
    app.store_mut()
        .edit(index, form)
        .await?
        .ok_or(CatalogError::NotFound(index))?;
    println!("edited #{index}: live handles = {}", registry.live_count());

    let removed = app
        .store_mut()
        .delete(index)
        .ok_or(CatalogError::NotFound(index))?;
    println!(
        "deleted '{}': live handles = {}, products = {}",
        removed.name,
        registry.live_count(),
        app.store().len()
    );

    let (w, h) = target_dimensions(200, 100, app.pipeline().config().max_width);
    println!("a 200x100 upload would be stored at {w}x{h}");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CatalogConfig::from_file(path)?,
        None => CatalogConfig::default(),
    };
    let mut app = AppBuilder::new().config(config).build()?;

    let result = match &cli.command {
        Command::Render { images, json } => render(&mut app, images, *json).await,
        Command::Thumbnail {
            input,
            out,
            max_width,
            quality,
        } => thumbnail(&mut app, input, out, *max_width, *quality).await,
        Command::Demo { first, second } => demo(&mut app, first, second).await,
    };

    // teardown runs on both success and failure
    app.shutdown();
    result
}
