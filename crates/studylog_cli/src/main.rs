//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `studylog_core` linkage.
//! - Seed an in-memory store and print one deterministic page summary.
//! - Write core logs to `$STUDYLOG_LOG_DIR` when that variable is set.

use studylog_core::{
    default_log_level, init_logging, CreateStudyLogRequest, LogConfig, MemoryStudyLogStore,
    ServiceResult, StudyLogService,
};

const LOG_DIR_ENV: &str = "STUDYLOG_LOG_DIR";

fn main() {
    println!("studylog_core version={}", studylog_core::core_version());

    if let Some(log_dir) = std::env::var_os(LOG_DIR_ENV) {
        if let Err(err) = init_logging(&LogConfig::new(default_log_level(), log_dir)) {
            eprintln!("studylog logging disabled: {err}");
        }
    }

    match run_smoke() {
        Ok(summary) => println!("{summary}"),
        Err(err) => {
            eprintln!("studylog smoke failed: {err}");
            std::process::exit(1);
        }
    }
}

fn run_smoke() -> ServiceResult<String> {
    let service = StudyLogService::new(MemoryStudyLogStore::new());
    for (title, category) in [("Ownership", "JAVA"), ("Beans", "SPRING"), ("Streams", "java")] {
        service.create_study_log(&CreateStudyLogRequest {
            title: title.to_string(),
            content: "smoke".to_string(),
            category: category.to_string(),
            understanding: "GOOD".to_string(),
            study_time_minutes: 30,
            study_date: None,
        })?;
    }

    let page = service.get_study_logs_by_category_with_paging("JAVA", Some(0), Some(10))?;
    Ok(format!(
        "studylog smoke total={} java_total={} java_page_len={}",
        service.count_study_logs()?,
        page.total_elements,
        page.content.len()
    ))
}
