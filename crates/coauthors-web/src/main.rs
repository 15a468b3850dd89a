//! `coauthors` binary: serves the site and administers the store.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `COAUTHORS_*` environment variables and opens the SQLite store named by
//! `store_path`.
//!
//! ```text
//! coauthors add-user --login admin --display-name "Site Admin" \
//!   --email admin@example.com --role administrator < password.txt
//! coauthors add-post --author admin --title "Hello" --content-file hello.html
//! coauthors serve
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use coauthors_core::{
  lifecycle,
  post::{NewPost, PostType},
  store::{AccountStore, PostCatalog},
  user::{NewAccount, Role},
};
use coauthors_store_sqlite::SqliteStore;
use coauthors_web::{AppState, ServerConfig, auth::hash_password};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Post contributors for a small publishing site")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Activate, then serve HTTP (the default).
  Serve,
  /// Run the platform version check and write the version marker.
  Activate,
  /// Delete the version marker and every stored contributor list.
  ///
  /// Stop any running `serve` first: it keeps its own metadata cache and
  /// would go on showing the removed lists.
  Uninstall,
  /// Print the argon2 hash for a password entered on stdin.
  HashPassword,
  /// Create a user account; the password is read from stdin.
  AddUser {
    #[arg(long)]
    login:        String,
    #[arg(long)]
    display_name: String,
    #[arg(long)]
    email:        String,
    #[arg(long, value_enum, default_value = "author")]
    role:         RoleArg,
    /// URL slug of the author page. Derived from the login when omitted.
    #[arg(long)]
    nicename:     Option<String>,
  },
  /// Create a post (or page) whose body is read from a file.
  AddPost {
    /// Login of the post's author.
    #[arg(long)]
    author:       String,
    #[arg(long)]
    title:        String,
    #[arg(long)]
    page:         bool,
    #[arg(long, value_name = "FILE")]
    content_file: PathBuf,
  },
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
  Administrator,
  Editor,
  Author,
  Contributor,
  Subscriber,
}

impl From<RoleArg> for Role {
  fn from(arg: RoleArg) -> Self {
    match arg {
      RoleArg::Administrator => Role::Administrator,
      RoleArg::Editor => Role::Editor,
      RoleArg::Author => Role::Author,
      RoleArg::Contributor => Role::Contributor,
      RoleArg::Subscriber => Role::Subscriber,
    }
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  match cli.command.unwrap_or(Command::Serve) {
    Command::HashPassword => {
      let password = read_password()?;
      println!("{}", hash_password(&password)?);
      Ok(())
    }
    Command::Serve => {
      let (server_cfg, store) = open(cli.config).await?;
      serve(store, server_cfg).await
    }
    Command::Activate => {
      let (server_cfg, store) = open(cli.config).await?;
      lifecycle::activate(&store, &server_cfg.platform_version).await?;
      Ok(())
    }
    Command::Uninstall => {
      let (_, store) = open(cli.config).await?;
      let report = lifecycle::uninstall(&store, &store).await?;
      println!("removed contributors from {} post(s)", report.purged_posts);
      Ok(())
    }
    Command::AddUser { login, display_name, email, role, nicename } => {
      let (_, store) = open(cli.config).await?;
      let password = read_password()?;
      let nicename = nicename.unwrap_or_else(|| slugify(&login));
      let user = store
        .add_account(NewAccount {
          login,
          display_name,
          email,
          nicename,
          role: role.into(),
          password_hash: hash_password(&password)?,
        })
        .await
        .context("failed to add user")?;
      println!("{}", user.id);
      Ok(())
    }
    Command::AddPost { author, title, page, content_file } => {
      let (_, store) = open(cli.config).await?;
      let account = store
        .find_account(&author)
        .await?
        .with_context(|| format!("no user with login {author:?}"))?;
      let content = std::fs::read_to_string(&content_file)
        .with_context(|| format!("failed to read {}", content_file.display()))?;
      let post = store
        .insert_post(NewPost {
          author: account.user.id,
          post_type: if page { PostType::Page } else { PostType::Post },
          title,
          content,
        })
        .await
        .context("failed to add post")?;
      println!("{}", post.id);
      Ok(())
    }
  }
}

/// Load configuration and open the SQLite store it names.
async fn open(config_path: PathBuf) -> anyhow::Result<(ServerConfig, SqliteStore)> {
  let settings = config::Config::builder()
    .add_source(config::File::from(config_path).required(false))
    .add_source(config::Environment::with_prefix("COAUTHORS"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  Ok((server_cfg, store))
}

async fn serve(store: SqliteStore, server_cfg: ServerConfig) -> anyhow::Result<()> {
  lifecycle::activate(&store, &server_cfg.platform_version)
    .await
    .context("activation failed")?;

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let state = AppState::new(store, server_cfg)?;
  let app = coauthors_web::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password line from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  eprint!("Password: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Lower-case the login and replace anything outside `[a-z0-9_-]` with `-`.
fn slugify(login: &str) -> String {
  login
    .trim()
    .to_lowercase()
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
    .collect()
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
