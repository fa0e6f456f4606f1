//! Integration tests for report submission
//!
//! A mockito server stands in for CDash's `submit.php`.

use cdash_reporter::render::{render, ReportKind};
use cdash_reporter::upload::md5_file_checksum;
use cdash_reporter::{
    BuildIdentity, CDashConfig, CDashReporter, CoarsePhase, LoggingHandler, PackageRecord,
    ReportData, ReportError, Reporter, Uploader,
};
use mockito::{Matcher, Server, ServerGuard};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const STARTTIME: i64 = 1_514_808_000;
const ACCEPTED: &str = "<cdash version=\"2.6\"><status>OK</status><message></message>\
                        <md5>ok</md5><buildId>42</buildId></cdash>";

fn config(server: &ServerGuard) -> CDashConfig {
    CDashConfig::new()
        .with_upload_url(format!("{}/cdash/submit.php?project=Spack", server.url()))
        .with_install_command("zlib")
        .with_site("test_site")
        .with_buildstamp("20180101-1200-Experimental")
}

fn reporter(config: &CDashConfig) -> CDashReporter {
    let uploader = Uploader::new(config.upload_url.clone(), Duration::from_secs(5)).unwrap();
    CDashReporter::with_parts(BuildIdentity::at(config, STARTTIME), uploader)
        .with_progress(Arc::new(LoggingHandler))
}

fn identity_query() -> Vec<Matcher> {
    vec![
        Matcher::UrlEncoded("project".into(), "Spack".into()),
        Matcher::UrlEncoded("build".into(), "zlib".into()),
        Matcher::UrlEncoded("site".into(), "test_site".into()),
        Matcher::UrlEncoded("stamp".into(), "20180101-1200-Experimental".into()),
    ]
}

fn zlib_data() -> ReportData {
    ReportData::single(
        "zlib",
        vec![PackageRecord::new("zlib").with_stdout(
            "==> Executing phase: 'configure'\n\
             checking for gcc... gcc\n\
             ==> Executing phase: 'install'\n\
             make install\n",
        )],
    )
}

#[test]
fn test_every_report_is_uploaded() {
    let mut server = Server::new();
    let mut query = identity_query();
    query.push(Matcher::Regex("MD5=[0-9a-f]{32}".into()));
    let mock = server
        .mock("PUT", "/cdash/submit.php")
        .match_query(Matcher::AllOf(query))
        .match_header("content-type", "text/xml")
        .with_status(200)
        .with_body(ACCEPTED)
        .expect(3)
        .create();

    let temp_dir = TempDir::new().unwrap();
    let outcomes = reporter(&config(&server))
        .build_report(temp_dir.path(), &zlib_data())
        .unwrap();

    mock.assert();
    assert_eq!(outcomes.len(), 3);
    let expected_link = format!("{}/cdash/buildSummary.php?buildid=42", server.url());
    for outcome in outcomes {
        let upload = outcome.upload.expect("upload outcome");
        assert_eq!(upload.build_id, Some(42));
        assert_eq!(upload.summary_url.as_deref(), Some(expected_link.as_str()));
    }
}

#[test]
fn test_concretization_report_uploads_once() {
    let mut server = Server::new();
    let config = config(&server);
    let message = "Conflicts in concretized spec";

    let identity = BuildIdentity::at(&config, STARTTIME);
    let body = render(&identity, &ReportKind::Update { message });
    let mut query = identity_query();
    query.push(Matcher::UrlEncoded(
        "MD5".into(),
        format!("{:x}", md5::compute(body.as_bytes())),
    ));

    let mock = server
        .mock("PUT", "/cdash/submit.php")
        .match_query(Matcher::AllOf(query))
        .match_header("content-length", body.len().to_string().as_str())
        .match_body(Matcher::Exact(body.clone()))
        .with_status(200)
        .with_body(ACCEPTED)
        .expect(1)
        .create();

    let temp_dir = TempDir::new().unwrap();
    let outcome = reporter(&config)
        .concretization_report(temp_dir.path(), message)
        .unwrap();

    mock.assert();
    assert_eq!(outcome.phase, CoarsePhase::Update);
    assert_eq!(fs::read_to_string(&outcome.path).unwrap(), body);
    assert_eq!(
        md5_file_checksum(&outcome.path).unwrap(),
        format!("{:x}", md5::compute(body.as_bytes()))
    );
}

#[test]
fn test_response_without_build_id() {
    let mut server = Server::new();
    let mock = server
        .mock("PUT", "/cdash/submit.php")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<cdash version=\"2.6\"><status>OK</status></cdash>")
        .expect(1)
        .create();

    let temp_dir = TempDir::new().unwrap();
    let outcome = reporter(&config(&server))
        .concretization_report(temp_dir.path(), "")
        .unwrap();

    mock.assert();
    let upload = outcome.upload.expect("upload outcome");
    assert_eq!(upload.build_id, None);
    assert_eq!(upload.summary_url, None);
}

#[test]
fn test_server_error_aborts_session() {
    let mut server = Server::new();
    let mock = server
        .mock("PUT", "/cdash/submit.php")
        .match_query(Matcher::Any)
        .with_status(500)
        .expect(1)
        .create();

    let temp_dir = TempDir::new().unwrap();
    let err = reporter(&config(&server))
        .build_report(temp_dir.path(), &zlib_data())
        .unwrap_err();

    mock.assert();
    assert!(matches!(err, ReportError::Upload { .. }));
    // Configure was written before its upload failed; nothing after it was
    assert!(temp_dir.path().join("Configure.xml").exists());
    assert!(!temp_dir.path().join("Build.xml").exists());
    assert!(!temp_dir.path().join("Update.xml").exists());
}

#[test]
fn test_unreachable_server() {
    let config = CDashConfig::new()
        .with_upload_url("http://127.0.0.1:1/cdash/submit.php?project=Spack")
        .with_install_command("zlib")
        .with_buildstamp("20180101-1200-Experimental");

    let temp_dir = TempDir::new().unwrap();
    let err = reporter(&config)
        .concretization_report(temp_dir.path(), "")
        .unwrap_err();

    assert!(matches!(err, ReportError::Upload { .. }));
    assert!(temp_dir.path().join("Update.xml").exists());
}
