//! CSV报告输出

use crate::error::ReportError;
use crate::health::CheckResult;
use std::io::Write;
use std::path::Path;

/// CSV表头
pub const CSV_HEADER: [&str; 3] = ["URL", "Status", "Response Time"];

/// 按输入顺序写出CSV，缺失的响应时间写为 `-`
pub fn write_csv<W: Write>(results: &[CheckResult], writer: W) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;

    for result in results {
        let response_time = result
            .response_time_secs()
            .map(|secs| secs.to_string())
            .unwrap_or_else(|| "-".to_string());
        let status = result.status_label();
        wtr.write_record([result.url.as_str(), status.as_str(), response_time.as_str()])?;
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// 生成CSV字节
pub fn csv_bytes(results: &[CheckResult]) -> Result<Vec<u8>, ReportError> {
    let mut buffer = Vec::new();
    write_csv(results, &mut buffer)?;
    Ok(buffer)
}

/// 覆盖写入CSV文件
pub fn write_csv_file(path: &Path, csv: &[u8]) -> Result<(), ReportError> {
    std::fs::write(path, csv).map_err(|source| ReportError::Write {
        path: path.display().to_string(),
        source,
    })
}
