use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use log::{debug, warn};
use pecha::backend::{
	CategorySource, ChangeSource, MemoryBackend, RecordSource, RecordStore, StorageUrls,
};
use pecha::error::SuggestionError;
use pecha::search::{
	Connectivity, ConnectivityMonitor, FilterState, GroupedTranslation, HistoryStore,
	ListingSearch, SearchConfig, SearchStats, SortDirection, SortField, SortSpec,
	SuggestionSession,
};
use pecha::session::{Identity, SessionContext};
use pecha::types::{Category, HistoryEntry, SearchSuggestion, TranslationRecord};
use pecha::{MetadataEdit, Moderator, SystemClock, ViewCountWatcher, record_view};
use serde::Serialize;

use crate::cli::{CliArgs, CliCommand, EditArgs, HistoryAction, SearchArgs, SuggestArgs};
use crate::settings::ResolvedConfig;

/// How long `suggest` waits for the backend after the debounce.
const FETCH_PATIENCE: Duration = Duration::from_secs(5);

/// Result of one CLI command, printed by [`crate::cli`].
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum Outcome {
	Listing {
		query: String,
		groups: Vec<GroupedTranslation>,
		stats: SearchStats,
		error: Option<String>,
	},
	Suggestions {
		term: String,
		suggestions: Vec<SearchSuggestion>,
		offline: bool,
		error: Option<String>,
		selected: Option<String>,
	},
	History {
		entries: Vec<HistoryEntry>,
	},
	Categories {
		categories: Vec<Category>,
	},
	Record {
		record: TranslationRecord,
	},
	Deleted {
		id: String,
	},
	Viewed {
		record: TranslationRecord,
		live_view_count: u64,
		source_url: Option<String>,
		translation_url: Option<String>,
	},
}

/// The library as seen by one CLI invocation.
pub(crate) struct Library {
	backend: Arc<MemoryBackend>,
	data_file: Option<PathBuf>,
	session: SessionContext,
	network: ConnectivityMonitor,
	search: SearchConfig,
	history_file: Option<PathBuf>,
	storage: Option<StorageUrls>,
}

impl Library {
	pub(crate) fn open(cli: &CliArgs, config: ResolvedConfig) -> Result<Self> {
		let backend = match &config.data_file {
			Some(path) if path.exists() => MemoryBackend::load(path)?,
			Some(path) => {
				warn!("{} does not exist; starting with an empty library", path.display());
				MemoryBackend::default()
			}
			None => MemoryBackend::default(),
		};

		let identity = cli
			.user
			.as_deref()
			.map(str::trim)
			.filter(|email| !email.is_empty())
			.map(|email| Identity::new(email, email));
		let session = SessionContext::resolve(identity, &config.admin);

		Ok(Self {
			backend: Arc::new(backend),
			data_file: config.data_file,
			session,
			network: ConnectivityMonitor::new(!cli.offline),
			search: config.search,
			history_file: config.history_file,
			storage: config.storage,
		})
	}

	pub(crate) fn run(&self, command: CliCommand) -> Result<Outcome> {
		match command {
			CliCommand::Search(args) => Ok(self.search(&args)),
			CliCommand::Suggest(args) => self.suggest(&args),
			CliCommand::History { action } => self.history(action.unwrap_or(HistoryAction::List)),
			CliCommand::Categories => Ok(Outcome::Categories {
				categories: self.backend.categories()?,
			}),
			CliCommand::Edit(args) => self.edit(&args),
			CliCommand::Delete { id } => self.delete(&id),
			CliCommand::View { id } => self.view(&id),
		}
	}

	fn search(&self, args: &SearchArgs) -> Outcome {
		let base = args.url.as_deref().unwrap_or_default();
		let mut listing = ListingSearch::from_query_string(base, &self.search, SystemClock);
		listing.update(|filters| apply_search_args(filters, args));

		let error = if self.network.is_online() {
			listing.search_now(self.backend.as_ref());
			listing.error().map(ToString::to_string)
		} else {
			Some(SuggestionError::Offline.to_string())
		};

		Outcome::Listing {
			query: listing.share_query(),
			groups: listing.results().to_vec(),
			stats: listing.stats(),
			error,
		}
	}

	fn suggest(&self, args: &SuggestArgs) -> Result<Outcome> {
		let mut session = SuggestionSession::new(
			Arc::clone(&self.backend) as Arc<dyn RecordSource>,
			Arc::new(self.network.clone()),
			self.open_history(),
			self.search.clone(),
		);
		session.input(&args.term);
		if !session.settle(self.search.debounce + FETCH_PATIENCE) {
			warn!("gave up waiting for suggestions for '{}'", args.term);
		}

		let selected = match args.select {
			Some(position) => {
				let Some(choice) = position
					.checked_sub(1)
					.and_then(|index| session.suggestions().get(index))
				else {
					bail!(
						"there is no suggestion #{position} ({} available)",
						session.suggestions().len()
					);
				};
				let term = choice.suggested_term.clone();
				session.add_to_history(&term);
				Some(term)
			}
			None => None,
		};

		Ok(Outcome::Suggestions {
			term: args.term.clone(),
			suggestions: session.suggestions().to_vec(),
			offline: session.is_offline(),
			error: session.error().map(ToString::to_string),
			selected,
		})
	}

	fn history(&self, action: HistoryAction) -> Result<Outcome> {
		let mut history = self.open_history();
		match action {
			HistoryAction::List => {}
			HistoryAction::Clear => history.clear(),
			HistoryAction::Remove { term } => {
				if !history.remove(&term) {
					bail!("'{term}' is not in the search history");
				}
			}
		}
		Ok(Outcome::History {
			entries: history.entries(),
		})
	}

	fn edit(&self, args: &EditArgs) -> Result<Outcome> {
		let admin = self.session.require_admin()?;
		let moderator = Moderator::new(self.backend.as_ref());
		let edit = MetadataEdit {
			title: args.title.clone(),
			tibetan_title: args.tibetan_title.clone(),
			description: args.description.clone(),
			tags: args.tags.clone(),
			featured: args.featured,
			view_count: args.views.clone(),
		};

		let mut record = moderator.update_metadata(&admin, &args.id, &edit)?;
		for tag in &args.add_tags {
			record = moderator.add_tag(&admin, &args.id, tag)?;
		}
		for tag in &args.remove_tags {
			record = moderator.remove_tag(&admin, &args.id, tag)?;
		}
		self.save()?;
		Ok(Outcome::Record { record })
	}

	fn delete(&self, id: &str) -> Result<Outcome> {
		let admin = self.session.require_admin()?;
		Moderator::new(self.backend.as_ref()).delete(&admin, id)?;
		self.save()?;
		Ok(Outcome::Deleted { id: id.to_string() })
	}

	fn view(&self, id: &str) -> Result<Outcome> {
		let before = self.backend.get(id)?;
		let watcher =
			ViewCountWatcher::watch(Arc::clone(&self.backend) as Arc<dyn ChangeSource>, &before);
		let record = record_view(self.backend.as_ref(), id)?;
		self.save()?;

		let resolve = |path: &Option<String>| {
			let storage = self.storage.as_ref()?;
			Some(storage.public_url(path.as_deref()?).to_string())
		};
		Ok(Outcome::Viewed {
			live_view_count: watcher.view_count(),
			source_url: resolve(&record.source_file_path),
			translation_url: resolve(&record.translation_file_path),
			record,
		})
	}

	fn open_history(&self) -> HistoryStore {
		match &self.history_file {
			Some(path) => HistoryStore::open(path, self.search.history_capacity),
			None => HistoryStore::in_memory(self.search.history_capacity),
		}
	}

	fn save(&self) -> Result<()> {
		let Some(path) = &self.data_file else {
			debug!("no data file configured; changes are not persisted");
			return Ok(());
		};
		self.backend
			.save(path)
			.with_context(|| format!("failed to persist changes to {}", path.display()))
	}
}

/// Layer explicit flags over filters restored from `--url`.
fn apply_search_args(filters: &mut FilterState, args: &SearchArgs) {
	if let Some(query) = &args.query {
		filters.term.clone_from(query);
	}
	for tag in &args.tags {
		if !filters.tags.contains(tag) {
			filters.tags.push(tag.clone());
		}
	}
	if let Some(category) = &args.category {
		filters.category = Some(category.clone());
	}
	if args.start.is_some() {
		filters.date_range.start = args.start;
	}
	if args.end.is_some() {
		filters.date_range.end = args.end;
	}
	let direction = if args.asc {
		SortDirection::Asc
	} else {
		SortDirection::Desc
	};
	match &args.sort {
		Some(field) => filters.sort = SortSpec::new(SortField::parse(field), direction),
		None if args.asc => filters.sort.direction = direction,
		None => {}
	}
}
