use serde_json::Value;

use super::{first_hit, non_blank, RawRecord, Rule};

const URL_KEYS: &[&str] = &["url", "pdpUrl", "productUrl", "product_url", "href", "link"];

const ID_KEYS: &[&str] = &["articleCode", "code", "productId", "id"];

const RULES: &[Rule<String>] = &[direct_url, seo_url, id_url];

pub(super) fn resolve(record: &RawRecord<'_>) -> Option<String> {
    first_hit(record, RULES)
}

fn direct_url(record: &RawRecord<'_>) -> Option<String> {
    record
        .first_text(URL_KEYS)
        .map(|href| record.profile.absolutize(href))
        .filter(|url| !url.is_empty())
}

/// `{keyword}-p{reference}` style URL. Only references whose base part
/// (before the first `-`) starts with `0` qualify.
fn seo_url(record: &RawRecord<'_>) -> Option<String> {
    let template = record.profile.seo_product_url.as_deref()?;
    let keyword = record.at("/seo/keyword").and_then(non_blank)?;
    let reference = record.at("/detail/reference").and_then(non_blank)?;
    let base = reference.split('-').next().filter(|b| b.starts_with('0'))?;
    Some(
        template
            .replace("{keyword}", keyword)
            .replace("{reference}", base),
    )
}

fn id_url(record: &RawRecord<'_>) -> Option<String> {
    let template = record.profile.id_product_url.as_deref()?;
    let id = ID_KEYS
        .iter()
        .filter_map(|key| record.get(key))
        .find_map(id_text)?;
    Some(template.replace("{id}", &id))
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(_) => non_blank(value).map(str::to_string),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use fitfinder_core::RetailerProfile;
    use serde_json::json;

    use super::*;

    fn zara_url(raw: &Value) -> Option<String> {
        let profile = RetailerProfile::zara();
        resolve(&RawRecord::new(raw, &profile, ""))
    }

    fn hm_url(raw: &Value) -> Option<String> {
        let profile = RetailerProfile::hm();
        resolve(&RawRecord::new(raw, &profile, ""))
    }

    #[test]
    fn relative_url_is_absolutized() {
        assert_eq!(
            zara_url(&json!({"url": "/us/en/skirt-p05039379.html"})).as_deref(),
            Some("https://www.zara.com/us/en/skirt-p05039379.html")
        );
        assert_eq!(
            hm_url(&json!({"pdpUrl": "en_us/productpage.1234567001.html"})).as_deref(),
            Some("https://www2.hm.com/en_us/productpage.1234567001.html")
        );
    }

    #[test]
    fn script_link_falls_through_to_id_url() {
        assert_eq!(
            zara_url(&json!({"href": "javascript:void(0)", "id": 311})).as_deref(),
            Some("https://www.zara.com/us/en/product/311")
        );
        assert_eq!(zara_url(&json!({"href": "#"})), None);
    }

    #[test]
    fn absolute_url_is_kept() {
        assert_eq!(
            hm_url(&json!({"link": "https://www2.hm.com/en_us/productpage.1.html"})).as_deref(),
            Some("https://www2.hm.com/en_us/productpage.1.html")
        );
    }

    #[test]
    fn seo_keyword_and_reference_build_url() {
        let raw = json!({
            "id": 311_594_384,
            "seo": {"keyword": "voluminous-soft-midi-skirt"},
            "detail": {"reference": "05039379-800-2"}
        });
        assert_eq!(
            zara_url(&raw).as_deref(),
            Some("https://www.zara.com/us/en/voluminous-soft-midi-skirt-p05039379.html")
        );
    }

    #[test]
    fn reference_without_leading_zero_falls_back_to_id() {
        let raw = json!({
            "id": 311_594_384,
            "seo": {"keyword": "skirt"},
            "detail": {"reference": "5039379-800"}
        });
        assert_eq!(
            zara_url(&raw).as_deref(),
            Some("https://www.zara.com/us/en/product/311594384")
        );
    }

    #[test]
    fn hm_id_url_prefers_article_code() {
        let raw = json!({"id": "x", "articleCode": "1234567001"});
        assert_eq!(
            hm_url(&raw).as_deref(),
            Some("https://www2.hm.com/en_us/productpage.1234567001.html")
        );
    }

    #[test]
    fn hm_has_no_seo_template() {
        let raw = json!({"seo": {"keyword": "skirt"}, "detail": {"reference": "0123-1"}});
        assert_eq!(hm_url(&raw), None);
    }

    #[test]
    fn nothing_usable_is_none() {
        assert_eq!(zara_url(&json!({"url": "", "id": null})), None);
    }
}
