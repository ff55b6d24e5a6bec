use std::env;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use log::{info, warn};

use serde::Deserialize;
use syl_gen_core::Error;
use syl_gen_core::io::list_files;
use syl_gen_core::model::generation_input::GenerationInput;
use syl_gen_core::model::generator::Generator;
use syl_gen_core::model::pool_set::PoolSet;
use syl_gen_core::model::segmenter::CaseMode;

/// Extension of the corpus files served from the chapters folder.
const CHAPTER_EXTENSION: &str = "txt";

/// Names returned by `/v1/generate` when `count` is omitted.
const DEFAULT_COUNT: usize = 20;

/// Upper limit on names per request.
const MAX_COUNT: usize = 10_000;

/// HTTP front-end for the syllable name generator.
#[derive(Parser, Debug)]
#[command(name = "syl-gen-server", version, about)]
struct ServerArgs {
	/// Folder holding the chapter files (one name per line, `.txt`)
	#[arg(long, default_value = "./chapters")]
	chapters: String,

	/// Address to bind
	#[arg(long, default_value = "127.0.0.1")]
	host: String,

	/// Port to bind
	#[arg(long, default_value_t = 5000)]
	port: u16,

	/// Comma-separated chapters to load at startup
	#[arg(long)]
	load: Option<String>,
}

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	count: Option<usize>,
	min_len: Option<usize>,
	max_len: Option<usize>,
	seed: Option<u64>,
}

#[derive(Deserialize)]
struct ChapterQuery {
	names: Option<String>,
	keep_case: Option<bool>,
}

struct SharedData {
	chapters_dir: PathBuf,
	pools: Option<PoolSet>,
}

impl GenerateParams {
	/// Builds a finite `GenerationInput` from the query.
	fn generation_input(&self) -> Result<GenerationInput, String> {
		let mut input = GenerationInput::new();
		input.count = self.count.unwrap_or(DEFAULT_COUNT);
		if input.count == 0 || input.count > MAX_COUNT {
			return Err(format!("count must be between 1 and {MAX_COUNT}"));
		}
		input.seed = self.seed;

		let defaults = input.bounds();
		input
			.set_bounds(
				self.min_len.unwrap_or(defaults.min_len()),
				self.max_len.unwrap_or(defaults.max_len()),
			)
			.map_err(|e| e.to_string())?;
		Ok(input)
	}
}

/// Resolves a chapter name to its file, refusing anything but a bare name.
fn chapter_path(dir: &Path, name: &str) -> Result<PathBuf, String> {
	let valid = !name.is_empty()
		&& !name.starts_with('.')
		&& !name.contains(['/', '\\']);
	if !valid {
		return Err(format!("Invalid chapter name: {name}"));
	}
	Ok(dir.join(format!("{name}.{CHAPTER_EXTENSION}")))
}

/// Loads the named chapters into a single `PoolSet`.
///
/// Every name is resolved before anything is read, and the chapters are
/// validated as one corpus.
fn load_chapters(dir: &Path, names: &[&str], case_mode: CaseMode) -> Result<PoolSet, String> {
	if names.is_empty() {
		return Err("Missing or empty chapter name".to_owned());
	}

	let mut paths = Vec::with_capacity(names.len());
	for name in names {
		let path = chapter_path(dir, name)?;
		if !path.is_file() {
			return Err(format!("Unknown chapter: {name}"));
		}
		paths.push(path);
	}

	PoolSet::from_files(&paths, case_mode)
		.map_err(|e| format!("Failed to load chapters {}: {e}", names.join(", ")))
}

/// Resolves the chapters folder against the working directory.
fn resolve_chapters_dir(dir: &str) -> PathBuf {
	let dir = PathBuf::from(dir);
	if dir.is_absolute() {
		return dir;
	}
	env::current_dir().map(|cwd| cwd.join(&dir)).unwrap_or(dir)
}

fn split_names(names: &str) -> Vec<&str> {
	names
		.split(',')
		.map(|s| s.trim())
		.filter(|s| !s.is_empty())
		.collect()
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates `count` names (default 20) from the loaded chapters.
/// Returns the names newline-separated as the response body.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<RwLock<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let input = match query.generation_input() {
		Ok(input) => input,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	let shared_data = match data.read() {
		Ok(d) => d,
		Err(_) => return HttpResponse::InternalServerError().body("Pool lock failed"),
	};
	let Some(pools) = shared_data.pools.as_ref() else {
		return HttpResponse::BadRequest().body("No chapters loaded");
	};

	match Generator::new(pools, &input).generate(input.count) {
		Ok(names) => HttpResponse::Ok().body(names.join("\n")),
		Err(e @ Error::BatchAborted { .. }) => HttpResponse::BadRequest().body(e.to_string()),
		Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

/// HTTP GET endpoint `/v1/pools`
///
/// Returns the pool report of the loaded chapters as JSON.
#[get("/v1/pools")]
async fn get_pools(data: web::Data<RwLock<SharedData>>) -> impl Responder {
	let shared_data = match data.read() {
		Ok(d) => d,
		Err(_) => return HttpResponse::InternalServerError().body("Pool lock failed"),
	};
	match shared_data.pools.as_ref() {
		Some(pools) => HttpResponse::Ok().json(pools.report()),
		None => HttpResponse::BadRequest().body("No chapters loaded"),
	}
}

#[get("/v1/chapters")]
async fn get_chapters(data: web::Data<RwLock<SharedData>>) -> impl Responder {
	let dir = match data.read() {
		Ok(d) => d.chapters_dir.clone(),
		Err(_) => return HttpResponse::InternalServerError().body("Pool lock failed"),
	};
	match list_files(&dir, CHAPTER_EXTENSION) {
		Ok(files) => {
			let names: Vec<&str> = files
				.iter()
				.filter_map(|file| file.strip_suffix(&format!(".{CHAPTER_EXTENSION}")))
				.collect();
			HttpResponse::Ok().body(names.join("\n"))
		}
		Err(_) => HttpResponse::InternalServerError().body("Failed to list chapters"),
	}
}

#[get("/v1/loaded_chapters")]
async fn get_loaded_chapters(data: web::Data<RwLock<SharedData>>) -> impl Responder {
	let shared_data = match data.read() {
		Ok(d) => d,
		Err(_) => return HttpResponse::InternalServerError().body("Pool lock failed"),
	};
	let sources = shared_data.pools.as_ref().map(|pools| pools.sources().join("\n")).unwrap_or_default();
	HttpResponse::Ok().body(sources)
}

/// HTTP PUT endpoint `/v1/load_chapters?names=a,b`
///
/// Rebuilds the pools from the named chapters. The previous pools stay
/// in place if any chapter fails to load.
#[put("/v1/load_chapters")]
async fn put_chapters(data: web::Data<RwLock<SharedData>>, query: web::Query<ChapterQuery>) -> impl Responder {
	let query_names = match &query.names {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty chapter name"),
	};
	let case_mode = if query.keep_case.unwrap_or(false) { CaseMode::Preserve } else { CaseMode::Fold };

	let dir = match data.read() {
		Ok(d) => d.chapters_dir.clone(),
		Err(_) => return HttpResponse::InternalServerError().body("Pool lock failed"),
	};

	let pools = match load_chapters(&dir, &split_names(query_names), case_mode) {
		Ok(pools) => pools,
		Err(e) => {
			warn!("{e}");
			return HttpResponse::BadRequest().body(e);
		}
	};

	let mut shared_data = match data.write() {
		Ok(d) => d,
		Err(_) => return HttpResponse::InternalServerError().body("Pool lock failed"),
	};
	info!("loaded chapters: {}", pools.sources().join(", "));
	shared_data.pools = Some(pools);

	HttpResponse::Ok().body("Chapters loaded successfully")
}

fn configure(cfg: &mut web::ServiceConfig) {
	cfg.service(get_generated)
		.service(get_pools)
		.service(get_chapters)
		.service(get_loaded_chapters)
		.service(put_chapters);
}

/// Main entry point for the server.
///
/// Optionally preloads chapters, wraps the pools in a `RwLock` so that
/// generation requests read them concurrently, and starts an Actix-web
/// HTTP server.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let args = ServerArgs::parse();
	let chapters_dir = resolve_chapters_dir(&args.chapters);

	let pools = match &args.load {
		Some(names) => match load_chapters(&chapters_dir, &split_names(names), CaseMode::Fold) {
			Ok(pools) => Some(pools),
			Err(e) => return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)),
		},
		None => None,
	};

	let shared_data = SharedData { chapters_dir, pools };
	let shared_pools = web::Data::new(RwLock::new(shared_data));

	info!("listening on {}:{}", args.host, args.port);
	HttpServer::new(move || {
		App::new()
			.wrap(Logger::default())
			.wrap(Cors::permissive())
			.app_data(shared_pools.clone())
			.configure(configure)
	})
		.bind((args.host.as_str(), args.port))?
		.run()
		.await
}
