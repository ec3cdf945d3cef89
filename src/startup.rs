use actix_web::{middleware::Logger, web, App, HttpServer};
use actix_web::dev::Server;
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::KeyRing;
use crate::middleware::BearerAuth;
use crate::routes::{current_session, health_check};

/// Build the HTTP server around an already configured key ring
///
/// The key ring is shared read-only by every worker; rotate it through the
/// returned `Arc` the caller keeps.
pub fn run(listener: TcpListener, key_ring: Arc<KeyRing>) -> Result<Server, std::io::Error> {
    let key_ring_data = web::Data::from(Arc::clone(&key_ring));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(key_ring_data.clone())
            .route("/health_check", web::get().to(health_check))
            // Protected routes (require a bearer token)
            .service(
                web::scope("/api")
                    .wrap(BearerAuth::new(Arc::clone(&key_ring)))
                    .route("/me", web::get().to(current_session)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
