use crate::constants::STATUS_ID;
use web_sys as web;

#[inline]
pub fn show(document: &web::Document, text: &str) {
    if let Some(el) = document.get_element_by_id(STATUS_ID) {
        el.set_text_content(Some(text));
        let cl = el.class_list();
        _ = cl.remove_1("hidden");
        _ = cl.remove_1("error");
        // fallback for pages without the CSS class
        _ = el.set_attribute("style", "");
    }
}

#[inline]
pub fn show_error(document: &web::Document, text: &str) {
    if let Some(el) = document.get_element_by_id(STATUS_ID) {
        el.set_text_content(Some(text));
        let cl = el.class_list();
        _ = cl.remove_1("hidden");
        _ = cl.add_1("error");
        _ = el.set_attribute("style", "");
    }
}

#[inline]
pub fn hide(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(STATUS_ID) {
        _ = el.class_list().add_1("hidden");
        // fallback
        _ = el.set_attribute("style", "display:none");
    }
}
