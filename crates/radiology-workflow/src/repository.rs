//! 数据访问接口
//!
//! 每个聚合一个仓储 trait，默认提供基于 `tokio::sync::RwLock` 的内存实现。
//! `save` 在对象没有 id 时分配新的自增 id。

use crate::search::{
    MrrtReportTemplateSearchCriteria, RadiologyOrderSearchCriteria, RadiologyReportSearchCriteria,
};
use async_trait::async_trait;
use radiology_core::{
    MrrtReportTemplate, RadiologyModality, RadiologyOrder, RadiologyReport, Result, Study,
};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait RadiologyOrderRepository: Send + Sync {
    async fn save(&self, order: RadiologyOrder) -> Result<RadiologyOrder>;
    async fn find_by_id(&self, order_id: i32) -> Result<Option<RadiologyOrder>>;
    async fn find_by_uuid(&self, uuid: &Uuid) -> Result<Option<RadiologyOrder>>;
    async fn find_by_patient(&self, patient_uuid: &Uuid) -> Result<Vec<RadiologyOrder>>;
    async fn search(&self, criteria: &RadiologyOrderSearchCriteria) -> Result<Vec<RadiologyOrder>>;
}

#[async_trait]
pub trait StudyRepository: Send + Sync {
    async fn save(&self, study: Study) -> Result<Study>;
    async fn find_by_id(&self, study_id: i32) -> Result<Option<Study>>;
    async fn find_by_order_id(&self, order_id: i32) -> Result<Option<Study>>;
    async fn find_by_study_instance_uid(&self, uid: &str) -> Result<Option<Study>>;
}

#[async_trait]
pub trait RadiologyReportRepository: Send + Sync {
    async fn save(&self, report: RadiologyReport) -> Result<RadiologyReport>;
    async fn find_by_id(&self, report_id: i32) -> Result<Option<RadiologyReport>>;
    async fn find_by_uuid(&self, uuid: &Uuid) -> Result<Option<RadiologyReport>>;
    async fn find_by_order(&self, order_id: i32) -> Result<Vec<RadiologyReport>>;
    async fn search(&self, criteria: &RadiologyReportSearchCriteria)
        -> Result<Vec<RadiologyReport>>;
}

#[async_trait]
pub trait RadiologyModalityRepository: Send + Sync {
    async fn save(&self, modality: RadiologyModality) -> Result<RadiologyModality>;
    async fn find_by_id(&self, modality_id: i32) -> Result<Option<RadiologyModality>>;
    async fn find_by_uuid(&self, uuid: &Uuid) -> Result<Option<RadiologyModality>>;
    async fn find_all(&self, include_retired: bool) -> Result<Vec<RadiologyModality>>;
}

#[async_trait]
pub trait MrrtReportTemplateRepository: Send + Sync {
    async fn save(&self, template: MrrtReportTemplate) -> Result<MrrtReportTemplate>;
    async fn delete(&self, template_id: i32) -> Result<()>;
    async fn find_by_id(&self, template_id: i32) -> Result<Option<MrrtReportTemplate>>;
    async fn find_by_uuid(&self, uuid: &Uuid) -> Result<Option<MrrtReportTemplate>>;
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<MrrtReportTemplate>>;
    async fn search(
        &self,
        criteria: &MrrtReportTemplateSearchCriteria,
    ) -> Result<Vec<MrrtReportTemplate>>;
}

/// 按 id 排序的内存表
#[derive(Debug)]
struct Table<T> {
    next_id: i32,
    rows: BTreeMap<i32, T>,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }

    fn assign_id(&mut self, id: Option<i32>) -> i32 {
        match id {
            Some(id) => {
                self.next_id = self.next_id.max(id + 1);
                id
            }
            None => {
                let id = self.next_id;
                self.next_id += 1;
                id
            }
        }
    }

    fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.rows.values().find(|row| predicate(row)).cloned()
    }

    fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.values().filter(|row| predicate(row)).cloned().collect()
    }
}

#[derive(Debug)]
pub struct InMemoryRadiologyOrderRepository {
    table: RwLock<Table<RadiologyOrder>>,
}

impl InMemoryRadiologyOrderRepository {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table::new()),
        }
    }
}

impl Default for InMemoryRadiologyOrderRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RadiologyOrderRepository for InMemoryRadiologyOrderRepository {
    async fn save(&self, mut order: RadiologyOrder) -> Result<RadiologyOrder> {
        let mut table = self.table.write().await;
        let id = table.assign_id(order.order_id);
        order.order_id = Some(id);
        table.rows.insert(id, order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, order_id: i32) -> Result<Option<RadiologyOrder>> {
        Ok(self.table.read().await.rows.get(&order_id).cloned())
    }

    async fn find_by_uuid(&self, uuid: &Uuid) -> Result<Option<RadiologyOrder>> {
        Ok(self.table.read().await.find(|o| o.uuid == *uuid))
    }

    async fn find_by_patient(&self, patient_uuid: &Uuid) -> Result<Vec<RadiologyOrder>> {
        Ok(self
            .table
            .read()
            .await
            .filter(|o| o.patient_uuid() == Some(*patient_uuid)))
    }

    async fn search(&self, criteria: &RadiologyOrderSearchCriteria) -> Result<Vec<RadiologyOrder>> {
        Ok(self.table.read().await.filter(|o| criteria.matches(o)))
    }
}

#[derive(Debug)]
pub struct InMemoryStudyRepository {
    table: RwLock<Table<Study>>,
}

impl InMemoryStudyRepository {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table::new()),
        }
    }
}

impl Default for InMemoryStudyRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StudyRepository for InMemoryStudyRepository {
    async fn save(&self, mut study: Study) -> Result<Study> {
        let mut table = self.table.write().await;
        let id = table.assign_id(study.study_id);
        study.study_id = Some(id);
        table.rows.insert(id, study.clone());
        Ok(study)
    }

    async fn find_by_id(&self, study_id: i32) -> Result<Option<Study>> {
        Ok(self.table.read().await.rows.get(&study_id).cloned())
    }

    async fn find_by_order_id(&self, order_id: i32) -> Result<Option<Study>> {
        Ok(self
            .table
            .read()
            .await
            .find(|s| s.radiology_order_id == Some(order_id)))
    }

    async fn find_by_study_instance_uid(&self, uid: &str) -> Result<Option<Study>> {
        Ok(self
            .table
            .read()
            .await
            .find(|s| s.study_instance_uid.as_deref() == Some(uid)))
    }
}

#[derive(Debug)]
pub struct InMemoryRadiologyReportRepository {
    table: RwLock<Table<RadiologyReport>>,
}

impl InMemoryRadiologyReportRepository {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table::new()),
        }
    }
}

impl Default for InMemoryRadiologyReportRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RadiologyReportRepository for InMemoryRadiologyReportRepository {
    async fn save(&self, mut report: RadiologyReport) -> Result<RadiologyReport> {
        let mut table = self.table.write().await;
        let id = table.assign_id(report.report_id);
        report.report_id = Some(id);
        table.rows.insert(id, report.clone());
        Ok(report)
    }

    async fn find_by_id(&self, report_id: i32) -> Result<Option<RadiologyReport>> {
        Ok(self.table.read().await.rows.get(&report_id).cloned())
    }

    async fn find_by_uuid(&self, uuid: &Uuid) -> Result<Option<RadiologyReport>> {
        Ok(self.table.read().await.find(|r| r.uuid == *uuid))
    }

    async fn find_by_order(&self, order_id: i32) -> Result<Vec<RadiologyReport>> {
        Ok(self
            .table
            .read()
            .await
            .filter(|r| r.radiology_order_id == order_id))
    }

    async fn search(
        &self,
        criteria: &RadiologyReportSearchCriteria,
    ) -> Result<Vec<RadiologyReport>> {
        let mut reports = self.table.read().await.filter(|r| criteria.matches(r));
        reports.sort_by_key(|r| r.report_date);
        Ok(reports)
    }
}

#[derive(Debug)]
pub struct InMemoryRadiologyModalityRepository {
    table: RwLock<Table<RadiologyModality>>,
}

impl InMemoryRadiologyModalityRepository {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table::new()),
        }
    }
}

impl Default for InMemoryRadiologyModalityRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RadiologyModalityRepository for InMemoryRadiologyModalityRepository {
    async fn save(&self, mut modality: RadiologyModality) -> Result<RadiologyModality> {
        let mut table = self.table.write().await;
        let id = table.assign_id(modality.modality_id);
        modality.modality_id = Some(id);
        table.rows.insert(id, modality.clone());
        Ok(modality)
    }

    async fn find_by_id(&self, modality_id: i32) -> Result<Option<RadiologyModality>> {
        Ok(self.table.read().await.rows.get(&modality_id).cloned())
    }

    async fn find_by_uuid(&self, uuid: &Uuid) -> Result<Option<RadiologyModality>> {
        Ok(self.table.read().await.find(|m| m.uuid == *uuid))
    }

    async fn find_all(&self, include_retired: bool) -> Result<Vec<RadiologyModality>> {
        Ok(self
            .table
            .read()
            .await
            .filter(|m| include_retired || !m.retired))
    }
}

#[derive(Debug)]
pub struct InMemoryMrrtReportTemplateRepository {
    table: RwLock<Table<MrrtReportTemplate>>,
}

impl InMemoryMrrtReportTemplateRepository {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table::new()),
        }
    }
}

impl Default for InMemoryMrrtReportTemplateRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MrrtReportTemplateRepository for InMemoryMrrtReportTemplateRepository {
    async fn save(&self, mut template: MrrtReportTemplate) -> Result<MrrtReportTemplate> {
        let mut table = self.table.write().await;
        let id = table.assign_id(template.template_id);
        template.template_id = Some(id);
        table.rows.insert(id, template.clone());
        Ok(template)
    }

    async fn delete(&self, template_id: i32) -> Result<()> {
        self.table.write().await.rows.remove(&template_id);
        Ok(())
    }

    async fn find_by_id(&self, template_id: i32) -> Result<Option<MrrtReportTemplate>> {
        Ok(self.table.read().await.rows.get(&template_id).cloned())
    }

    async fn find_by_uuid(&self, uuid: &Uuid) -> Result<Option<MrrtReportTemplate>> {
        Ok(self.table.read().await.find(|t| t.uuid == *uuid))
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<MrrtReportTemplate>> {
        Ok(self
            .table
            .read()
            .await
            .find(|t| t.dc_terms_identifier.as_deref() == Some(identifier)))
    }

    async fn search(
        &self,
        criteria: &MrrtReportTemplateSearchCriteria,
    ) -> Result<Vec<MrrtReportTemplate>> {
        let mut templates = self.table.read().await.filter(|t| criteria.matches(t));
        templates.sort_by(|a, b| a.dc_terms_title.cmp(&b.dc_terms_title));
        Ok(templates)
    }
}
