//! 放射报告服务
//!
//! 报告生命周期：创建即认领 (CLAIMED)，之后可以取消认领 (DISCONTINUED)
//! 或完成 (COMPLETED)。后两者为终态，不能再保存或变更。
//! 状态检查总是针对仓储中已保存的报告，调用方持有的副本只提供可编辑内容。

use crate::report_validator::RadiologyReportValidator;
use crate::repository::RadiologyReportRepository;
use crate::search::RadiologyReportSearchCriteria;
use chrono::Local;
use radiology_core::{
    Provider, RadiologyError, RadiologyOrder, RadiologyReport, RadiologyReportStatus, Result,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

pub struct RadiologyReportService {
    reports: Arc<dyn RadiologyReportRepository>,
    validator: RadiologyReportValidator,
    // 读取已保存状态到写回之间不允许其他生命周期操作
    lifecycle: Mutex<()>,
}

/// 终态报告拒绝 `action` 操作
fn ensure_not_final(report: &RadiologyReport, action: &str) -> Result<()> {
    match report.report_status {
        RadiologyReportStatus::Discontinued => Err(RadiologyError::unsupported(format!(
            "a discontinued radiologyReport cannot be {}",
            action
        ))),
        RadiologyReportStatus::Completed => Err(RadiologyError::unsupported(format!(
            "a completed radiologyReport cannot be {}",
            action
        ))),
        RadiologyReportStatus::Claimed => Ok(()),
    }
}

fn persisted_order_id(order: &RadiologyOrder) -> Result<i32> {
    order
        .order_id
        .ok_or_else(|| RadiologyError::illegal_argument("radiologyOrder is not persisted"))
}

impl RadiologyReportService {
    pub fn new(reports: Arc<dyn RadiologyReportRepository>) -> Self {
        Self {
            reports,
            validator: RadiologyReportValidator::new(),
            lifecycle: Mutex::new(()),
        }
    }

    /// 为已完成检查的医嘱创建报告并认领
    pub async fn create_and_claim_radiology_report(
        &self,
        order: &RadiologyOrder,
    ) -> Result<RadiologyReport> {
        let order_id = persisted_order_id(order)?;
        if order.is_not_completed() {
            return Err(RadiologyError::illegal_argument(
                "radiologyOrder needs to be completed",
            ));
        }

        let _guard = self.lifecycle.lock().await;
        if self.has_completed_report(order_id).await? {
            return Err(RadiologyError::unsupported(
                "cannot create radiologyReport for this radiologyOrder because it is already completed",
            ));
        }
        if self.has_claimed_report(order_id).await? {
            return Err(RadiologyError::unsupported(
                "cannot create radiologyReport for this radiologyOrder because it is already claimed",
            ));
        }

        let report = self.reports.save(RadiologyReport::new(order_id)).await?;
        info!("Claimed radiology report {:?} for order {}", report.report_id, order_id);
        Ok(report)
    }

    /// 保存已认领报告的正文与解读者
    pub async fn save_radiology_report(&self, report: RadiologyReport) -> Result<RadiologyReport> {
        let _guard = self.lifecycle.lock().await;
        let mut stored = self.stored_report(&report, "saved").await?;
        stored.report_body = report.report_body;
        stored.principal_results_interpreter = report.principal_results_interpreter;
        self.reports.save(stored).await
    }

    pub async fn unclaim_radiology_report(
        &self,
        report: RadiologyReport,
    ) -> Result<RadiologyReport> {
        let _guard = self.lifecycle.lock().await;
        let mut stored = self.stored_report(&report, "unclaimed").await?;
        stored.report_status = RadiologyReportStatus::Discontinued;
        let stored = self.reports.save(stored).await?;
        info!("Unclaimed radiology report {:?}", stored.report_id);
        Ok(stored)
    }

    /// 以调用方提交的正文完成报告
    pub async fn complete_radiology_report(
        &self,
        report: RadiologyReport,
        principal_results_interpreter: Option<Provider>,
    ) -> Result<RadiologyReport> {
        let interpreter = principal_results_interpreter.ok_or_else(|| {
            RadiologyError::illegal_argument("principalResultsInterpreter cannot be null")
        })?;

        let _guard = self.lifecycle.lock().await;
        let mut stored = self.stored_report(&report, "completed").await?;
        stored.report_body = report.report_body;
        stored.principal_results_interpreter = Some(interpreter);

        let errors = self.validator.validate(&stored);
        if errors.has_errors() {
            warn!("Rejected completion of radiology report {:?}: {}", stored.report_id, errors);
        }
        errors.into_result()?;

        stored.report_date = Some(Local::now().naive_local());
        stored.report_status = RadiologyReportStatus::Completed;
        let stored = self.reports.save(stored).await?;
        info!("Completed radiology report {:?}", stored.report_id);
        Ok(stored)
    }

    /// 按条件查询报告，结果按报告日期升序
    pub async fn get_radiology_reports(
        &self,
        criteria: &RadiologyReportSearchCriteria,
    ) -> Result<Vec<RadiologyReport>> {
        self.reports.search(criteria).await
    }

    pub async fn get_radiology_report(&self, report_id: i32) -> Result<Option<RadiologyReport>> {
        self.reports.find_by_id(report_id).await
    }

    pub async fn get_radiology_report_by_uuid(
        &self,
        uuid: &Uuid,
    ) -> Result<Option<RadiologyReport>> {
        self.reports.find_by_uuid(uuid).await
    }

    pub async fn get_radiology_reports_by_radiology_order_and_report_status(
        &self,
        order_id: i32,
        status: RadiologyReportStatus,
    ) -> Result<Vec<RadiologyReport>> {
        Ok(self
            .reports
            .find_by_order(order_id)
            .await?
            .into_iter()
            .filter(|r| r.report_status == status)
            .collect())
    }

    pub async fn has_radiology_order_claimed_radiology_report(
        &self,
        order: &RadiologyOrder,
    ) -> Result<bool> {
        self.has_claimed_report(persisted_order_id(order)?).await
    }

    pub async fn has_radiology_order_completed_radiology_report(
        &self,
        order: &RadiologyOrder,
    ) -> Result<bool> {
        self.has_completed_report(persisted_order_id(order)?).await
    }

    /// 已完成的报告优先，其次是已认领的报告
    pub async fn get_active_radiology_report_by_radiology_order(
        &self,
        order: &RadiologyOrder,
    ) -> Result<Option<RadiologyReport>> {
        let reports = self.reports.find_by_order(persisted_order_id(order)?).await?;
        let by_status = |status: RadiologyReportStatus| {
            reports.iter().find(|r| r.report_status == status).cloned()
        };

        Ok(by_status(RadiologyReportStatus::Completed)
            .or_else(|| by_status(RadiologyReportStatus::Claimed)))
    }

    /// 读取已保存的报告并确认其仍处于认领状态
    async fn stored_report(
        &self,
        report: &RadiologyReport,
        action: &str,
    ) -> Result<RadiologyReport> {
        let report_id = report
            .report_id
            .ok_or_else(|| RadiologyError::illegal_argument("radiologyReport is not persisted"))?;
        let stored = self
            .reports
            .find_by_id(report_id)
            .await?
            .ok_or_else(|| RadiologyError::NotFound(format!("radiology report {}", report_id)))?;
        ensure_not_final(&stored, action)?;
        Ok(stored)
    }

    async fn has_claimed_report(&self, order_id: i32) -> Result<bool> {
        Ok(!self
            .get_radiology_reports_by_radiology_order_and_report_status(
                order_id,
                RadiologyReportStatus::Claimed,
            )
            .await?
            .is_empty())
    }

    async fn has_completed_report(&self, order_id: i32) -> Result<bool> {
        Ok(!self
            .get_radiology_reports_by_radiology_order_and_report_status(
                order_id,
                RadiologyReportStatus::Completed,
            )
            .await?
            .is_empty())
    }
}
