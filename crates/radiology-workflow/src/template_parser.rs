//! MRRT 报告模板解析
//!
//! 从模板 HTML 的 `meta` 标签读取字符集和 Dublin Core 元数据。解析前先校验：
//! 必须恰好有一个 `meta[charset]`，至少一个 `meta[name]`，`dcterms.date` 须为 `yyyy-MM-dd`。

use chrono::NaiveDate;
use radiology_core::{MrrtReportTemplate, RadiologyError, Result, ValidationErrors};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const ERROR_CHARSET_OCCURRENCE: &str =
    "radiology.MrrtReportTemplate.validation.error.meta.charset.occurence";
const ERROR_DUBLIN_CORE_MISSING: &str =
    "radiology.MrrtReportTemplate.validation.error.meta.dublinCore.missing";
const ERROR_DATE_INVALID: &str = "radiology.MrrtReportTemplate.validation.error.date.invalid";

static META_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b([^>]*)>").expect("valid meta tag pattern"));

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z][a-z0-9_.:-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>/]+))"#)
        .expect("valid attribute pattern")
});

static BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body\b[^>]*>(.*)</body>").expect("valid body pattern"));

/// 单个 `meta` 标签的属性，属性名小写
type MetaTag = HashMap<String, String>;

fn meta_tags(html: &str) -> Vec<MetaTag> {
    META_TAG
        .captures_iter(html)
        .map(|tag| {
            ATTRIBUTE
                .captures_iter(&tag[1])
                .map(|attr| {
                    let value = attr
                        .get(2)
                        .or_else(|| attr.get(3))
                        .or_else(|| attr.get(4))
                        .map_or("", |m| m.as_str());
                    (attr[1].to_ascii_lowercase(), value.to_string())
                })
                .collect()
        })
        .collect()
}

/// `meta` 标签规则校验
fn validate_meta_tags(tags: &[MetaTag]) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if tags.iter().filter(|t| t.contains_key("charset")).count() != 1 {
        errors.reject("meta[charset]", ERROR_CHARSET_OCCURRENCE);
    }
    if !tags.iter().any(|t| t.contains_key("name")) {
        errors.reject("meta[name]", ERROR_DUBLIN_CORE_MISSING);
    }
    let date = tags
        .iter()
        .find(|t| t.get("name").map(String::as_str) == Some("dcterms.date"));
    if let Some(date) = date {
        let content = date.get("content").map_or("", String::as_str);
        if NaiveDate::parse_from_str(content, DATE_FORMAT).is_err() {
            errors.reject("meta[name=dcterms.date]", ERROR_DATE_INVALID);
        }
    }

    errors
}

/// MRRT 模板文件解析器
#[derive(Debug, Default, Clone, Copy)]
pub struct MrrtReportTemplateFileParser;

impl MrrtReportTemplateFileParser {
    pub fn new() -> Self {
        Self
    }

    /// 校验并解析模板，模板原文保存在结果中
    pub fn parse(&self, html: &str) -> Result<MrrtReportTemplate> {
        let tags = meta_tags(html);
        validate_meta_tags(&tags).into_result()?;

        let mut template = MrrtReportTemplate::new(html);
        template.charset = tags.iter().find_map(|t| t.get("charset").cloned());

        for tag in &tags {
            let Some(name) = tag.get("name") else {
                continue;
            };
            let content = tag.get("content").cloned();
            let slot = match name.as_str() {
                "dcterms.title" => &mut template.dc_terms_title,
                "dcterms.description" => &mut template.dc_terms_description,
                "dcterms.identifier" => &mut template.dc_terms_identifier,
                "dcterms.type" => &mut template.dc_terms_type,
                "dcterms.language" => &mut template.dc_terms_language,
                "dcterms.publisher" => &mut template.dc_terms_publisher,
                "dcterms.rights" => &mut template.dc_terms_rights,
                "dcterms.license" => &mut template.dc_terms_license,
                "dcterms.date" => &mut template.dc_terms_date,
                "dcterms.creator" => &mut template.dc_terms_creator,
                other => {
                    debug!("Unhandled meta tag {}", other);
                    continue;
                }
            };
            *slot = content;
        }
        Ok(template)
    }

    /// 模板 `body` 元素的内容
    pub fn html_body(&self, template: &MrrtReportTemplate) -> Result<String> {
        BODY.captures(&template.html)
            .map(|body| body[1].trim().to_string())
            .ok_or_else(|| {
                RadiologyError::illegal_argument("mrrtReportTemplate has no body element")
            })
    }
}
