use sijang_core::catalog::Catalog;

pub fn handle(catalog: &Catalog) -> String {
    format!("저희 사이트에서 취급하는 주요 상품 목록입니다:\n\n{}", grouped_listing(catalog))
}

/// Catalog grouped by produce category with per-group counts and a total.
/// Shared with the price handler's unknown-item reply.
pub fn grouped_listing(catalog: &Catalog) -> String {
    let mut out = String::new();
    for (group, items) in Catalog::groups() {
        out.push_str(&format!(
            "📦 {} ({}종)\n   {}\n\n",
            group.label(),
            items.len(),
            items.join(", "),
        ));
    }
    out.push_str(&format!(
        "총 {}가지의 농산물을 취급하고 있습니다.\n특정 상품에 대한 자세한 정보가 필요하시면 언제든 말씀해 주세요!",
        catalog.len(),
    ));
    out
}
