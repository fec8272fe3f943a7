//! Basic example demonstrating chained GET and POST requests.
//!
//! This example shows how to:
//! - Build a GET request with query parameters and decode JSON
//! - Send a JSON body with a POST request
//! - Inspect status, headers and cookies without reading the body
//!
//! Run with: `cargo run --example basic_call`

use fluent_http::{Client, Error};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Post {
    #[serde(rename = "userId")]
    user_id: u32,
    id: u32,
    title: String,
    body: String,
}

#[derive(Debug, Serialize)]
struct NewPost {
    title: String,
    body: String,
    #[serde(rename = "userId")]
    user_id: u32,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("fluent_http=debug,basic_call=info")
        .init();

    let client = Client::builder()
        .default_header("User-Agent", "fluent-http-demo/0.1")?
        .build()?;

    println!("=== GET Request Example ===");
    let posts: Vec<Post> = client
        .get("https://jsonplaceholder.typicode.com/posts")
        .query("userId", "1")
        .send()
        .await
        .json()
        .await?;

    println!("User 1 has {} posts", posts.len());
    if let Some(first) = posts.first() {
        println!("First title: {}", first.title);
    }
    println!();

    println!("=== POST Request Example ===");
    let new_post = NewPost {
        title: "My New Post".to_string(),
        body: "This is the content of my new post!".to_string(),
        user_id: 1,
    };

    let response = client
        .post("https://jsonplaceholder.typicode.com/posts")
        .json(&new_post)
        .send()
        .await;

    // The API answers 201 Created, which is reported once the body is read.
    println!("Status: {}", response.status());
    println!("Content-Type: {:?}", response.header("content-type"));
    match response.json::<Post>().await {
        Ok(post) => println!("Created post ID: {}", post.id),
        Err(e) => println!("Decode failed: {e}"),
    }

    Ok(())
}
