//! Serves the built dashboard. Unmatched GET/HEAD paths get `index.html`
//! so the browser-side router can resolve them; other methods get 404.

use std::path::{Path, PathBuf};

use actix_files::{Files, NamedFile};
use actix_web::dev::{fn_service, ServiceRequest, ServiceResponse};
use actix_web::http::Method;
use actix_web::HttpResponse;

pub fn spa_service(dir: &Path) -> Files {
    let index: PathBuf = dir.join("index.html");
    Files::new("/", dir)
        .index_file("index.html")
        .default_handler(fn_service(move |req: ServiceRequest| {
            let index = index.clone();
            async move {
                let (req, _) = req.into_parts();
                if !matches!(*req.method(), Method::GET | Method::HEAD) {
                    let res = HttpResponse::NotFound().finish();
                    return Ok::<_, actix_web::Error>(ServiceResponse::new(req, res));
                }
                let file = NamedFile::open_async(&index).await?;
                let res = file.into_response(&req);
                Ok::<_, actix_web::Error>(ServiceResponse::new(req, res))
            }
        }))
}
