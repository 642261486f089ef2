use anyhow::bail;
use quorum_core::{classify_type, extract_identifiers, network_hint, primary_id};
use quorum_model::Flow;

pub fn run(subject: &str, flow: &str, body: &str) -> anyhow::Result<()> {
    let flow = parse_flow(flow)?;
    let identifiers = extract_identifiers(subject, body);
    let entity_type = classify_type(subject, flow, &identifiers);
    let card_id = primary_id(entity_type, &identifiers, subject);

    println!("type:       {}", entity_type.as_str());
    println!("primary id: {}", card_id);
    if let Some(network) = network_hint(subject) {
        println!("network:    {:?}", network);
    }
    if let Some(cip) = &identifiers.cip_number {
        println!("cip number: {}", cip);
    }
    if let Some(app) = &identifiers.app_name {
        println!("app name:   {}", app);
    }
    if let Some(validator) = &identifiers.validator_name {
        println!("validator:  {}", validator);
    }
    Ok(())
}

fn parse_flow(value: &str) -> anyhow::Result<Flow> {
    Ok(match value {
        "cip" => Flow::Cip,
        "featured-app" => Flow::FeaturedApp,
        "shared" => Flow::Shared,
        "other" => Flow::Other,
        _ => bail!("unknown flow {:?}; expected cip, featured-app, shared, or other", value),
    })
}
