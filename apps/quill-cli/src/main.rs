//! Quill CLI
//!
//! Lists, searches and edits posts through the Quill API. Mutations go
//! through the optimistic sync layer, so the listing printed afterwards
//! reflects the outcome whether the server accepted the change or not.

mod render;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use quill_core::domain::{PostFilter, SortField, SortOrder};
use quill_core::ports::{MessageHandler, PubSub, handler};
use quill_infra::InMemoryPubSub;
use quill_shared::UpdatePostRequest;
use quill_sync::{
    HttpPostsApi, PostForm, PostStore, PostSync, PubSubRefresh, REFRESH_CHANNEL, TracingNotifier,
};

/// How long to wait for the refresh signal before printing anyway.
const REFRESH_TIMEOUT: Duration = Duration::from_secs(2);

/// Quill CLI
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(about = "Manage blog posts through the Quill API")]
struct Args {
    /// API root URL
    #[arg(long, env = "QUILL_API_URL", default_value = "http://127.0.0.1:8080/api")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List posts, optionally filtered and ordered
    List {
        /// Text to search for in title, content and author
        #[arg(short, long)]
        query: Option<String>,

        /// Field to sort by (createdAt, updatedAt, title, author)
        #[arg(short, long, default_value_t = SortField::CreatedAt)]
        sort: SortField,

        /// Sort direction (asc, desc)
        #[arg(short, long, default_value_t = SortOrder::Desc)]
        order: SortOrder,
    },

    /// Show a single post
    Show {
        /// The post id
        id: String,
    },

    /// Create a post
    Create {
        #[arg(long)]
        title: String,

        #[arg(long)]
        content: String,

        #[arg(long)]
        author: String,
    },

    /// Change some fields of a post
    Edit {
        /// The post id
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,

        #[arg(long)]
        author: Option<String>,
    },

    /// Delete a post
    Delete {
        /// The post id
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();

    let pubsub = Arc::new(InMemoryPubSub::default());
    let (refresh_tx, mut refresh_rx) = mpsc::unbounded_channel();
    pubsub
        .subscribe(REFRESH_CHANNEL, forward_to(refresh_tx))
        .await?;

    let sync = PostSync::new(
        Arc::new(HttpPostsApi::new(&args.base_url)?),
        PostStore::new(),
        Arc::new(TracingNotifier),
        Arc::new(PubSubRefresh::new(pubsub)),
    );

    let listing = PostFilter::default();
    let outcome = match args.command {
        Command::List { query, sort, order } => {
            sync.load(&PostFilter { query, sort, order }).await?;
            print!("{}", render::table(&sync.store().snapshot()));
            return Ok(());
        }
        Command::Show { id } => {
            let post = sync
                .fetch(&id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Post not found"))?;
            print!("{}", render::detail(&post));
            return Ok(());
        }
        Command::Create {
            title,
            content,
            author,
        } => {
            sync.load(&listing).await?;
            sync.create(PostForm::new(title, content, author))
                .await
                .map(drop)
        }
        Command::Edit {
            id,
            title,
            content,
            author,
        } => {
            sync.load(&listing).await?;
            let changes = UpdatePostRequest {
                title,
                content,
                author,
            };
            sync.update(&id, changes).await.map(drop)
        }
        Command::Delete { id } => {
            sync.load(&listing).await?;
            sync.delete(&id).await
        }
    };

    reload_after_mutation(&sync, &listing, &mut refresh_rx).await;
    print!("{}", render::table(&sync.store().snapshot()));

    outcome?;
    Ok(())
}

/// Reload the listing once the refresh signal arrives.
///
/// A failed reload only leaves the local state in place; the mutation's own
/// result is what the command reports.
async fn reload_after_mutation(
    sync: &PostSync,
    listing: &PostFilter,
    refresh_rx: &mut mpsc::UnboundedReceiver<String>,
) {
    match tokio::time::timeout(REFRESH_TIMEOUT, refresh_rx.recv()).await {
        Ok(Some(operation)) => {
            tracing::debug!(%operation, "Refresh requested");
            if let Err(e) = sync.load(listing).await {
                tracing::warn!(error = %e, "Reload failed; showing local state");
            }
        }
        _ => tracing::warn!("No refresh signal received; showing local state"),
    }
}

/// Pub/sub handler that forwards payloads into a channel.
fn forward_to(tx: mpsc::UnboundedSender<String>) -> MessageHandler {
    handler(move |msg| {
        let tx = tx.clone();
        async move {
            let _ = tx.send(msg.payload);
        }
    })
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,quill_sync=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}
