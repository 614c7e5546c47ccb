//! The journal's web pages and JSON endpoints.

use std::{collections::HashMap, convert::Infallible, sync::Arc};

use log::{debug, error, info};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tera::{Context, Tera, Value};
use tokio::{sync::Mutex, task::JoinError};
use warp::{
    http::{StatusCode, Uri},
    reply::{Html, WithStatus},
    Filter, Rejection, Reply,
};

use crate::{
    conditions::Conditions,
    intake::{self, FieldError, RawCatchInput, COMMON_SPECIES},
    models::{CatchId, CatchRecord},
    stats::Summary,
    store::CatchStore,
};

/// The store shared by all requests. The lock makes every mutation run alone.
pub type SharedStore = Arc<Mutex<CatchStore>>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Could not render template")]
    RenderTemplate(#[source] tera::Error),
}

fn weight_formatter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    match value.as_f64() {
        Some(weight) => Ok(Value::String(format!("{weight:.1} lbs"))),
        None => Err(tera::Error::msg("Could not format weight")),
    }
}

/// Whole inches print without a fraction, e.g. `18 in` and `14.5 in`.
fn length_formatter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    match value.as_f64() {
        Some(length) => Ok(Value::String(format!("{length} in"))),
        None => Err(tera::Error::msg("Could not format length")),
    }
}

static TEMPLATES: Lazy<Tera> = Lazy::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_template("journal.html", include_str!("../templates/journal.html"))
        .expect("journal template parses");
    tera.register_filter("weight", weight_formatter);
    tera.register_filter("inches", length_formatter);
    tera
});

#[derive(Serialize)]
struct Row<'a> {
    id: &'a str,
    species: &'a str,
    weight: f64,
    length: f64,
    location: &'a str,
    date: String,
    time: String,
    notes: &'a str,
}

impl<'a> From<&'a CatchRecord> for Row<'a> {
    fn from(record: &'a CatchRecord) -> Self {
        Self {
            id: record.id.as_str(),
            species: &record.species,
            weight: record.weight,
            length: record.length,
            location: &record.location,
            date: record.display_date(),
            time: record.display_time(),
            notes: &record.notes,
        }
    }
}

fn render_journal(
    catches: &[CatchRecord],
    form: &RawCatchInput,
    errors: &[FieldError],
) -> Result<Html<String>, Error> {
    let rows: Vec<_> = catches.iter().map(Row::from).collect();
    let errors: Vec<_> = errors.iter().map(ToString::to_string).collect();

    let mut context = Context::new();
    context.insert("catches", &rows);
    context.insert("summary", &Summary::of(catches));
    context.insert("form", form);
    context.insert("errors", &errors);
    context.insert("species", &COMMON_SPECIES);
    context.insert("conditions", &Conditions::now());

    Ok(warp::reply::html(
        TEMPLATES
            .render("journal.html", &context)
            .map_err(Error::RenderTemplate)?,
    ))
}

fn page(result: Result<Html<String>, Error>, status: StatusCode) -> Box<dyn Reply> {
    match result {
        Ok(html) => Box::new(warp::reply::with_status(html, status)),
        Err(err) => {
            error!("Could not render journal: {err:?}");
            Box::new(internal_server_error())
        }
    }
}

fn internal_server_error() -> WithStatus<&'static str> {
    warp::reply::with_status("", StatusCode::INTERNAL_SERVER_ERROR)
}

fn back_to_journal() -> impl Reply {
    warp::redirect::see_other(Uri::from_static("/"))
}

async fn journal(store: SharedStore) -> Result<Box<dyn Reply>, Infallible> {
    let store = store.lock().await;
    let form = RawCatchInput {
        time: "06:00".to_string(),
        ..Default::default()
    };

    Ok(page(
        render_journal(store.catches(), &form, &[]),
        StatusCode::OK,
    ))
}

/// Run a mutation on the blocking pool, since observers write to disk. The
/// lock is held until the mutation and its writes are done.
async fn mutate<T, F>(store: SharedStore, f: F) -> Result<T, JoinError>
where
    F: FnOnce(&mut CatchStore) -> T + Send + 'static,
    T: Send + 'static,
{
    let mut store = store.lock_owned().await;
    tokio::task::spawn_blocking(move || f(&mut store)).await
}

fn mutated<T>(result: Result<T, JoinError>) -> Box<dyn Reply> {
    match result {
        Ok(_) => Box::new(back_to_journal()),
        Err(err) => {
            error!("Mutation did not finish: {err}");
            Box::new(internal_server_error())
        }
    }
}

async fn log_catch(store: SharedStore, form: RawCatchInput) -> Result<Box<dyn Reply>, Infallible> {
    match intake::validate(form.clone()) {
        Ok(draft) => Ok(mutated(mutate(store, move |store| store.add(draft)).await)),
        Err(rejected) => {
            info!("Rejected submission: {rejected}");
            let store = store.lock().await;
            Ok(page(
                render_journal(store.catches(), &form, &rejected.errors),
                StatusCode::UNPROCESSABLE_ENTITY,
            ))
        }
    }
}

async fn delete_catch(id: String, store: SharedStore) -> Result<Box<dyn Reply>, Infallible> {
    let id = CatchId::new(id);
    Ok(mutated(mutate(store, move |store| store.remove(&id)).await))
}

async fn list_catches(store: SharedStore) -> Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&store.lock().await.list()))
}

async fn summary(store: SharedStore) -> Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&Summary::of(store.lock().await.catches())))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SpeciesQuery {
    q: String,
}

fn with_store(
    store: SharedStore,
) -> impl Filter<Extract = (SharedStore,), Error = Infallible> + Clone {
    warp::any().map(move || store.clone())
}

pub fn routes(
    store: SharedStore,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    // GET /
    let journal_route = warp::get()
        .and(warp::path::end())
        .and(with_store(store.clone()))
        .and_then(journal);

    // POST /catches
    let log_route = warp::post()
        .and(warp::path("catches"))
        .and(warp::path::end())
        .and(with_store(store.clone()))
        .and(warp::body::content_length_limit(16 * 1024))
        .and(warp::body::form::<RawCatchInput>())
        .and_then(log_catch);

    // POST /catches/:id/delete
    let delete_route = warp::post()
        .and(warp::path!("catches" / String / "delete"))
        .and(with_store(store.clone()))
        .and_then(delete_catch);

    // GET /api/catches
    let list_route = warp::get()
        .and(warp::path!("api" / "catches"))
        .and(with_store(store.clone()))
        .and_then(list_catches);

    // GET /api/stats
    let stats_route = warp::get()
        .and(warp::path!("api" / "stats"))
        .and(with_store(store))
        .and_then(summary);

    // GET /api/conditions
    let conditions_route = warp::get()
        .and(warp::path!("api" / "conditions"))
        .map(|| warp::reply::json(&Conditions::now()));

    // GET /api/species?q=
    let species_route = warp::get()
        .and(warp::path!("api" / "species"))
        .and(warp::query::<SpeciesQuery>())
        .map(|query: SpeciesQuery| warp::reply::json(&intake::suggest_species(&query.q)));

    journal_route
        .or(log_route)
        .or(delete_route)
        .or(list_route)
        .or(stats_route)
        .or(species_route)
        .or(conditions_route)
        .with(warp::log::custom(|info| {
            debug!("{} {} {}", info.method(), info.path(), info.status());
        }))
}
