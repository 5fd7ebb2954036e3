//! # Resolution Orchestrator — the Fetch-and-Register Round Loop
//!
//! Before validation may touch a document whose `$ref`s point at
//! unregistered remote schemas, those schemas must be fetched and
//! registered. This module drives that closure: ask the registry what is
//! missing, fan the loader out over the whole round, register the
//! results, and repeat — newly registered documents may reference
//! further missing schemas — until nothing is missing or the round
//! budget runs out.
//!
//! Rounds are strict barriers: every fetch in a round completes before
//! anything from that round is registered, so completion order within a
//! round is unobservable and registration from round N only feeds round
//! N+1's missing-set computation. The first loader failure (in
//! missing-list order) aborts the whole operation; sibling results from
//! that round are discarded.
//!
//! Each URI is requested at most once per validator lifetime — the
//! `requested` set persists so repeated validations never re-issue a
//! fetch that already happened (or already failed).

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;

use jsv_core::{ErrorKind, ValidationError};

use crate::loader::SchemaLoader;
use crate::registry::SchemaRegistry;

/// Drain the registry's missing-reference set through `loader`.
///
/// `max_rounds` bounds the reference-chasing recursion (a fetched schema
/// may itself reference missing schemas). On success every reference is
/// resolvable and validation can run without I/O. On failure returns a
/// single Loader or Budget error.
pub(crate) async fn load_missing_refs(
    registry: &mut SchemaRegistry,
    requested: &mut HashSet<String>,
    loader: &Arc<dyn SchemaLoader>,
    max_rounds: u32,
) -> Result<(), ValidationError> {
    let mut budget = max_rounds;

    loop {
        let missing: Vec<String> = registry
            .missing_schemas()
            .into_iter()
            .filter(|uri| !requested.contains(uri))
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        if budget == 0 {
            return Err(ValidationError::new(
                ErrorKind::Budget,
                "",
                "#",
                "maxRecursion",
                json!(missing),
                None,
                format!(
                    "would exceed the recursion budget fetching these referenced schemas \
                     (raise the resolution depth if you need to go deeper): {}",
                    missing.join(", ")
                ),
            ));
        }

        for uri in &missing {
            requested.insert(uri.clone());
        }

        tracing::debug!(round_size = missing.len(), budget, "fetching referenced schemas");

        // One round: all fetches complete before anything registers.
        let round = futures::future::join_all(missing.iter().map(|uri| {
            let loader = Arc::clone(loader);
            async move { (uri.clone(), loader.load(uri).await) }
        }))
        .await;

        let mut fetched = Vec::with_capacity(round.len());
        for (uri, result) in round {
            match result {
                Ok(schema) => fetched.push((uri, schema)),
                Err(error) => {
                    return Err(ValidationError::new(
                        ErrorKind::Loader,
                        "",
                        "#",
                        "$ref",
                        json!(uri),
                        None,
                        error.to_string(),
                    ));
                }
            }
        }

        for (uri, schema) in fetched {
            registry.register(&schema, Some(&uri));
        }
        budget -= 1;
    }
}
