use serde_json::json;
use storefront_core::config::LoadOptions;
use storefront_db::{connect_with_settings, migrations, DemoCatalog, SqlDocumentStore};

use crate::bootstrap::prepare;
use crate::commands::{CommandResult, Failure};

/// Loads the demo catalog into the local database. Safe to run repeatedly.
pub fn run(options: &LoadOptions) -> CommandResult {
    let (config, runtime) = match prepare("seed", options) {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.store.database_url,
            config.store.max_connections,
            config.store.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        let store = SqlDocumentStore::new(pool.clone());
        let outcome = async {
            migrations::run_pending(&pool)
                .await
                .map_err(|error| ("migration", error.to_string(), 5u8))?;
            let seeded = DemoCatalog::load(&store)
                .await
                .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;
            let verification = DemoCatalog::verify(&store)
                .await
                .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

            if verification.all_present {
                Ok::<_, Failure>(seeded.products_seeded)
            } else {
                let failed: Vec<&str> = verification
                    .checks
                    .iter()
                    .filter_map(|(check, passed)| (!passed).then_some(check.as_str()))
                    .collect();
                Err(("seed_verification", verification_message(&failed), 6u8))
            }
        }
        .await;

        pool.close().await;
        outcome
    });

    match result {
        Ok(products) => CommandResult::success_with_data(
            "seed",
            format!("demo catalog loaded: {} products", products.len()),
            json!({ "products": products }),
        ),
        Err(failure) => CommandResult::from_failure("seed", failure),
    }
}

fn verification_message(failed: &[&str]) -> String {
    if failed.is_empty() {
        "Some demo products failed to load".to_string()
    } else {
        format!("Seed verification failed for products: {}", failed.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::verification_message;

    #[test]
    fn verification_message_names_missing_products() {
        assert_eq!(
            verification_message(&["watch-rose-gold", "bracelet-pearl"]),
            "Seed verification failed for products: watch-rose-gold, bracelet-pearl"
        );
    }

    #[test]
    fn verification_message_falls_back_to_generic_text() {
        assert_eq!(verification_message(&[]), "Some demo products failed to load");
    }
}
