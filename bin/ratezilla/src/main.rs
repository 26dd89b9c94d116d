use ratezilla_net::server::build_server;

#[tokio::main]
async fn main() {
    build_server().await;
}
