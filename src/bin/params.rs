use pricemap::config::RenderConfig;

fn main() -> Result<(), serde_json::Error> {
    let params = RenderConfig::default();
    println!("{}", serde_json::to_string_pretty(&params)?);
    Ok(())
}
