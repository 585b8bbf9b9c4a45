//! TikTak management commands.

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;
use tiktak::ui::{self, FeedOptions, Outcome, Session};
use tiktak::{Settings, app, logging};
use tiktak_client::{Client, DEFAULT_API_URL};
use tiktak_db::Store;

#[derive(Parser, Debug)]
#[command(name = "manage")]
#[command(about = "Run and administer the TikTak service", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Apply pending migrations, then serve the API until interrupted
	Runserver {
		/// Port to listen on (overrides settings)
		#[arg(short, long)]
		port: Option<u16>,
	},
	/// Apply all pending migrations
	Migrate,
	/// Revert the most recently applied migration
	Rollback,
	/// Load the demo users, posts and comment
	Seed,
	/// Delete every user, post and comment
	Unseed,
	/// Create a user and log in as them
	Signup {
		username: String,
		#[command(flatten)]
		api: ApiArgs,
	},
	/// Log in as an existing user
	Login {
		username: String,
		#[command(flatten)]
		api: ApiArgs,
	},
	/// Forget the current user
	Logout,
	/// Show the current user
	Whoami,
	/// Show every post
	Feed {
		/// Expand the comments of every post
		#[arg(short, long)]
		comments: bool,
		#[command(flatten)]
		api: ApiArgs,
	},
	/// Publish a post as the current user
	Post {
		contents: String,
		#[command(flatten)]
		api: ApiArgs,
	},
	/// Comment on a post as the current user
	Comment {
		post_id: i64,
		contents: String,
		#[command(flatten)]
		api: ApiArgs,
	},
}

#[derive(clap::Args, Debug)]
struct ApiArgs {
	/// Root URL of the REST API
	#[arg(long, env = "TIKTAK_API_URL", default_value = DEFAULT_API_URL)]
	api_url: String,
}

impl ApiArgs {
	fn client(&self) -> Client {
		Client::new(self.api_url.clone())
	}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	let mut settings = Settings::load().context("failed to load settings")?;
	logging::init(&settings.log_filter);

	match cli.command {
		Command::Runserver { port } => {
			if let Some(port) = port {
				settings.port = port;
			}
			println!(
				"{}",
				style(format!("Starting server on http://{}", settings.bind_addr()))
					.cyan()
					.bold()
			);
			app::run(&settings).await?;
		}
		Command::Migrate => {
			let store = Store::connect(&settings.database_config()).await?;
			let result = store.migrate().await;
			store.close().await;
			let result = result?;
			if result.applied.is_empty() {
				println!("{}", style("No migrations to apply").green());
			} else {
				for name in &result.applied {
					println!("  {} {}", style("Applied").green(), name);
				}
			}
		}
		Command::Rollback => {
			let store = Store::connect(&settings.database_config()).await?;
			let reverted = store.rollback().await;
			store.close().await;
			match reverted? {
				Some(name) => println!("  {} {}", style("Reverted").yellow(), name),
				None => println!("{}", style("No migrations to revert").green()),
			}
		}
		Command::Seed => {
			let store = app::open_store(&settings).await?;
			let summary = tiktak_db::seed(&store).await;
			store.close().await;
			let summary = summary?;
			println!(
				"{}",
				style(format!(
					"Seeded {} users, {} posts, {} comment(s)",
					summary.users, summary.posts, summary.comments
				))
				.green()
			);
		}
		Command::Unseed => {
			let store = app::open_store(&settings).await?;
			let result = tiktak_db::unseed(&store).await;
			store.close().await;
			result?;
			println!("{}", style("Removed all users, posts and comments").green());
		}
		Command::Signup { username, api } => {
			let session = Session::from_env();
			report(ui::sign_up(&api.client(), &session, &username).await?);
		}
		Command::Login { username, api } => {
			let session = Session::from_env();
			report(ui::log_in(&api.client(), &session, &username).await?);
		}
		Command::Logout => {
			ui::log_out(&Session::from_env())?;
			println!("Logged out");
		}
		Command::Whoami => match Session::from_env().current_username()? {
			Some(username) => println!("{}", username),
			None => println!("{}", style("Not logged in").dim()),
		},
		Command::Feed { comments, api } => {
			let session = Session::from_env();
			let current = session.current_username()?;
			let posts = api.client().list_posts().await?;
			let options = FeedOptions {
				current_username: current.as_deref(),
				show_comments: comments,
			};
			print!("{}", ui::render_feed(&posts, options));
		}
		Command::Post { contents, api } => {
			let session = Session::from_env();
			report(ui::create_post(&api.client(), &session, &contents).await?);
		}
		Command::Comment {
			post_id,
			contents,
			api,
		} => {
			let session = Session::from_env();
			report(ui::add_comment(&api.client(), &session, post_id, &contents).await?);
		}
	}

	Ok(())
}

fn report(outcome: Outcome) {
	match outcome {
		Outcome::Done(message) => println!("{}", style(message).green()),
		Outcome::Skipped => println!("{}", style("Nothing to send").dim()),
	}
}
