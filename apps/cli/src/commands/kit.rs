//! # Kit Commands

use std::io::Write;

use stockbook_core::{KitComponent, KitListing};
use stockbook_store::Session;
use tracing::info;

use crate::error::CliError;

pub async fn add<W: Write>(
    session: &mut Session,
    name: &str,
    components: Vec<KitComponent>,
    image: Option<String>,
    out: &mut W,
) -> Result<(), CliError> {
    let kit = session.compose_kit(name, components, image).await?;

    info!(kit = %kit.name(), "Kit composed");
    let parts: Vec<String> = kit
        .components()
        .iter()
        .map(|c| format!("{} × {}", c.quantity, c.sku))
        .collect();
    writeln!(out, "Composed kit {}: {}", kit.name(), parts.join(", "))?;
    Ok(())
}

pub fn list<W: Write>(session: &Session, out: &mut W) -> Result<(), CliError> {
    let kits = KitListing::all(session.catalog())?;

    if kits.is_empty() {
        writeln!(out, "No kits yet.")?;
        return Ok(());
    }

    for kit in &kits {
        match &kit.image_ref {
            Some(image) => writeln!(out, "{} ({})", kit.name, image)?,
            None => writeln!(out, "{}", kit.name)?,
        }
        for line in &kit.components {
            writeln!(out, "  {:>3} × {:<16} {}", line.quantity, line.sku, line.product_name)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockbook_core::Money;
    use stockbook_store::StoreConfig;

    #[tokio::test]
    async fn test_compose_and_list() {
        let mut session = Session::open(StoreConfig::in_memory()).await.unwrap();
        session
            .register_product("A1", "Savon lavande", 5, Money::from_cents(500), None)
            .await
            .unwrap();

        let mut out = Vec::new();
        add(&mut session, "K1", vec![KitComponent::new("A1", 2)], Some("k1.png".into()), &mut out)
            .await
            .unwrap();
        list(&session, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Composed kit K1: 2 × A1"));
        assert!(text.contains("K1 (k1.png)"));
        assert!(text.contains("Savon lavande"));
    }

    #[tokio::test]
    async fn test_unknown_component() {
        let mut session = Session::open(StoreConfig::in_memory()).await.unwrap();
        let mut out = Vec::new();

        let err = add(&mut session, "K1", vec![KitComponent::new("ZZ", 1)], None, &mut out)
            .await
            .unwrap_err();
        assert_eq!(err.message(), "no product with SKU 'ZZ'");
        assert!(session.catalog().ledger().kits().is_empty());
    }
}
