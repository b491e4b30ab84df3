use crate::error::Error;
use serde_json::Value;
use std::{fs, io::ErrorKind, path::PathBuf};
use tracing::debug;

/// Returns parsed JSON given a path relative to some data root.
pub trait JsonSource {
    fn load(&self, path: &str) -> Result<Value, Error>;
}

/// Reads JSON files below a directory on the local filesystem.
#[derive(Clone, Debug)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl JsonSource for DirSource {
    fn load(&self, path: &str) -> Result<Value, Error> {
        let full = self.root.join(path.trim_start_matches("./"));
        debug!(path = %full.display(), "reading json");

        let serialized = fs::read_to_string(&full).map_err(|source| match source.kind() {
            // Mirrors a 404 from a web server so callers see one failure shape.
            ErrorKind::NotFound => Error::Fetch {
                path: path.to_string(),
                status: 404,
            },
            _ => Error::Io {
                path: full.display().to_string(),
                source,
            },
        })?;

        Ok(serde_json::from_str(&serialized)?)
    }
}

/// Fetches JSON over HTTP(S) relative to a base URL.
#[cfg(feature = "http")]
pub struct HttpSource {
    base: String,
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl HttpSource {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.trim_end_matches('/'),
            path.trim_start_matches("./").trim_start_matches('/')
        )
    }
}

#[cfg(feature = "http")]
impl JsonSource for HttpSource {
    fn load(&self, path: &str) -> Result<Value, Error> {
        let url = self.url(path);
        debug!(%url, "fetching json");

        let transport = |err: reqwest::Error| Error::Transport {
            path: url.clone(),
            reason: err.to_string(),
        };

        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .map_err(transport)?;

        if !resp.status().is_success() {
            return Err(Error::Fetch {
                path: url.clone(),
                status: resp.status().as_u16(),
            });
        }

        let body = resp.text().map_err(transport)?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> DirSource {
        DirSource::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures"))
    }

    #[test]
    fn load_existing() {
        let value = fixtures().load("./data/meta.json").unwrap();
        assert!(value.get("updated_at").is_some());
    }

    #[test]
    fn missing_file_is_fetch_error() {
        match fixtures().load("data/missing.json") {
            Err(Error::Fetch { path, status }) => {
                assert_eq!(path, "data/missing.json");
                assert_eq!(status, 404);
            }
            other => panic!("expected fetch error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_json() {
        assert!(matches!(
            fixtures().load("data/broken.json"),
            Err(Error::Json(_))
        ));
    }

    #[cfg(feature = "http")]
    mod http {
        use super::*;
        use std::{
            io::{BufRead, BufReader, Write},
            net::TcpListener,
            thread,
        };

        /// Answers a single request with `status` and `body`, returning the
        /// base URL to fetch from.
        fn serve_once(status: &'static str, body: &'static str) -> String {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = listener.local_addr().unwrap();

            thread::spawn(move || {
                let (mut stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut line = String::new();
                while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                    line.clear();
                }
                write!(
                    stream,
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                )
                .unwrap();
            });

            format!("http://{addr}/")
        }

        #[test]
        fn ok_response_is_parsed() {
            let base = serve_once("200 OK", r#"{"updated_at":"2025-01-01"}"#);
            let value = HttpSource::new(base).load("data/meta.json").unwrap();
            assert_eq!(value["updated_at"], "2025-01-01");
        }

        #[test]
        fn error_status_is_fetch_error() {
            let base = serve_once("404 Not Found", "{}");
            match HttpSource::new(base.clone()).load("./data/meta.json") {
                Err(Error::Fetch { path, status }) => {
                    assert_eq!(path, format!("{base}data/meta.json"));
                    assert_eq!(status, 404);
                }
                other => panic!("expected fetch error, got {other:?}"),
            }
        }
    }
}
