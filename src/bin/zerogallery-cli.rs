use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use zerogallery::{ClientConfig, CreateAlbumRequest, DataItem, GalleryClient};

#[derive(Parser)]
#[command(name = "zerogallery-cli")]
#[command(about = "CLI for the ZeroGallery media gallery", long_about = None)]
struct Cli {
    /// Service URL
    #[arg(long, env = "ZEROGALLERY_URL", default_value = zerogallery::config::DEFAULT_BASE_URL)]
    url: String,

    /// Access token (can also be set via ZEROGALLERY_TOKEN env var)
    #[arg(long, env = "ZEROGALLERY_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Download chunk size in bytes
    #[arg(long, env = "ZEROGALLERY_CHUNK_SIZE", default_value_t = zerogallery::config::DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the API version
    Version,
    /// List albums
    Albums,
    /// Create an album
    CreateAlbum {
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Protect the album with this token
        #[arg(long, default_value = "")]
        protect: String,

        /// Allow token holders to remove data
        #[arg(long)]
        allow_remove_data: bool,
    },
    /// Delete an album
    DeleteAlbum { id: i64 },
    /// List data items (items without an album unless --album is given)
    List {
        #[arg(short, long)]
        album: Option<i64>,
    },
    /// Upload one or more files
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(short, long)]
        album: Option<i64>,
    },
    /// Download a data item
    Download { id: i64, output: PathBuf },
    /// Save the preview image of a data item
    Preview { id: i64, output: PathBuf },
    /// Read a byte range of a data item
    Range {
        id: i64,

        #[arg(long)]
        start: Option<u64>,

        #[arg(long)]
        end: Option<u64>,

        /// Write the bytes here instead of only printing headers
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a data item
    Delete { id: i64 },
}

fn print_item(item: &DataItem) {
    println!(
        "{:>6}  {:<32}  {:>9}  {:<16}  {}",
        item.id,
        item.name,
        item.format_size(),
        item.mime_type,
        item.created_at().format("%Y-%m-%d %H:%M")
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::new(cli.url).with_chunk_size(cli.chunk_size);
    if let Some(token) = cli.token {
        config = config.with_token(token);
    }

    let client = GalleryClient::with_config(config)?;
    let client = client.scope()?;

    match cli.command {
        Commands::Version => {
            println!("{}", client.get_version().await?);
        }
        Commands::Albums => {
            for album in client.get_albums().await? {
                println!(
                    "{:>6}  {:<32}  {}{}",
                    album.id,
                    album.name,
                    album.description,
                    if album.is_protected { "  [protected]" } else { "" }
                );
            }
        }
        Commands::CreateAlbum {
            name,
            description,
            protect,
            allow_remove_data,
        } => {
            let request = CreateAlbumRequest::new(name)
                .with_description(description)
                .with_token(protect)
                .with_allow_remove_data(allow_remove_data);
            let album = client.create_album(&request).await?;
            println!("✅ Created album: {} (ID: {})", album.name, album.id);
        }
        Commands::DeleteAlbum { id } => {
            client.delete_album(id).await?;
            println!("✅ Deleted album {}", id);
        }
        Commands::List { album } => {
            let items = match album {
                Some(id) => client.get_album_data(id).await?,
                None => client.get_data_without_albums().await?,
            };
            for item in &items {
                print_item(item);
            }
            println!("{} items", items.len());
        }
        Commands::Upload { files, album } => {
            if files.len() == 1 {
                let id = client.upload_file(&files[0], album).await?;
                println!("✅ Uploaded {} (ID: {})", files[0].display(), id);
            } else {
                let ids = client.upload_multiple_files(&files, album).await?;
                for (file, id) in files.iter().zip(ids) {
                    println!("✅ Uploaded {} (ID: {})", file.display(), id);
                }
            }
        }
        Commands::Download { id, output } => {
            let size = client
                .download_data_with_progress(id, &output, None, |percent| async move {
                    eprint!("\rDownloading... {:5.1}%", percent);
                })
                .await?;
            eprintln!();
            println!("✅ Downloaded {} bytes to {}", size, output.display());
        }
        Commands::Preview { id, output } => {
            client.save_preview(id, &output).await?;
            println!("✅ Preview saved to {}", output.display());
        }
        Commands::Range {
            id,
            start,
            end,
            output,
        } => {
            let chunk = client.get_video_stream(id, start, end).await?;
            println!("Status:         {}", chunk.status);
            println!("Content-Range:  {}", chunk.content_range);
            println!("Content-Length: {}", chunk.content_length);
            println!("Content-Type:   {}", chunk.content_type);
            if let Some(path) = output {
                tokio::fs::write(&path, &chunk.data).await?;
                println!("✅ Wrote {} bytes to {}", chunk.data.len(), path.display());
            }
        }
        Commands::Delete { id } => {
            client.delete_data(id).await?;
            println!("✅ Deleted data {}", id);
        }
    }

    Ok(())
}
