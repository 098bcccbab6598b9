//! 医嘱校验
//!
//! 下达医嘱前校验必填项与日期之间的约束；停止医嘱时要求停止人和停止原因。

use chrono::{Local, NaiveDateTime};
use radiology_core::{Provider, RadiologyOrder, Urgency, ValidationErrors};

const ERROR_NULL: &str = "error.null";
const ERROR_DATE_ACTIVATED_IN_FUTURE: &str = "Order.error.dateActivatedInFuture";
const ERROR_DATE_ACTIVATED_AFTER_STOPPED: &str = "Order.error.dateActivatedAfterDiscontinuedDate";
const ERROR_URGENCY_NOT_ON_SCHEDULED_DATE: &str = "Order.error.urgencyNotOnScheduledDate";
const ERROR_SCHEDULED_DATE_MISSING: &str = "Order.error.scheduledDateNullForOnScheduledDateUrgency";

/// 放射检查医嘱校验器
#[derive(Debug, Default, Clone, Copy)]
pub struct RadiologyOrderValidator;

impl RadiologyOrderValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, order: &RadiologyOrder) -> ValidationErrors {
        self.validate_at(order, Local::now().naive_local())
    }

    /// 以 `now` 作为当前时间校验
    pub fn validate_at(&self, order: &RadiologyOrder, now: NaiveDateTime) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if order.patient.is_none() {
            errors.reject("patient", ERROR_NULL);
        }
        if order.orderer.is_none() {
            errors.reject("orderer", ERROR_NULL);
        }
        if order.urgency.is_none() {
            errors.reject("urgency", ERROR_NULL);
        }

        if let Some(activated) = order.date_activated {
            if activated > now {
                errors.reject("dateActivated", ERROR_DATE_ACTIVATED_IN_FUTURE);
            } else if order.date_stopped.is_some_and(|stopped| activated > stopped) {
                errors.reject("dateActivated", ERROR_DATE_ACTIVATED_AFTER_STOPPED);
                errors.reject("dateStopped", ERROR_DATE_ACTIVATED_AFTER_STOPPED);
            }
        }

        let on_scheduled_date = order.urgency == Some(Urgency::OnScheduledDate);
        if order.scheduled_date.is_some() && !on_scheduled_date {
            errors.reject("urgency", ERROR_URGENCY_NOT_ON_SCHEDULED_DATE);
        }
        if on_scheduled_date && order.scheduled_date.is_none() {
            errors.reject("scheduledDate", ERROR_SCHEDULED_DATE_MISSING);
        }

        errors
    }
}

/// 停止医嘱请求校验器
#[derive(Debug, Default, Clone, Copy)]
pub struct RadiologyDiscontinuedOrderValidator;

impl RadiologyDiscontinuedOrderValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(
        &self,
        orderer: Option<&Provider>,
        non_coded_discontinue_reason: Option<&str>,
    ) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if orderer.is_none() {
            errors.reject("orderer", ERROR_NULL);
        }
        if non_coded_discontinue_reason.map_or(true, |r| r.trim().is_empty()) {
            errors.reject("orderReasonNonCoded", ERROR_NULL);
        }
        errors
    }
}
