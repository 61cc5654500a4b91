use doxie_http::DoxieClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads DOXIE_URL, DOXIE_PORT and DOXIE_PASSWORD.
    let doxie = DoxieClient::from_env();

    let hello = doxie.hello().await?;
    println!("{hello:?}");

    let recent = doxie.most_recent_scan().await?;
    let thumbnail = doxie.get_thumbnail(&recent.path).await?;
    println!(
        "{}: {} byte thumbnail ({})",
        recent.path,
        thumbnail.bytes.len(),
        thumbnail.content_type.as_deref().unwrap_or("unknown type")
    );

    Ok(())
}
