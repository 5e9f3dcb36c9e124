//! Built-in admin resources for the site's content tables.

use crate::config::TableAccessDescriptor;

const NEWEST_FIRST: &str = "t.created_at DESC, t.id DESC";
const BY_POSITION: &str = "t.position ASC, t.id ASC";

const POST_COLUMNS: &[&str] = &[
    "title_model",
    "card_image_url",
    "full_image_url",
    "card_description",
    "work_list",
    "gallery_images",
    "full_description",
    "video_image_url",
    "video_link",
];

fn post_table(path: &str, table: &str) -> TableAccessDescriptor {
    TableAccessDescriptor::new(path, table)
        .order_by(NEWEST_FIRST)
        .mutable(POST_COLUMNS)
        .required(&["title_model"])
        .json(&["work_list", "gallery_images"])
        .touch_updated_at()
}

pub fn builtin_descriptors() -> Vec<TableAccessDescriptor> {
    vec![
        TableAccessDescriptor::new("/admin/banners", "public.banners")
            .order_by("t.priority ASC, t.id ASC")
            .mutable(&["section", "title", "image_url", "priority"])
            .required(&["section", "title", "image_url"]),
        TableAccessDescriptor::new("/admin/contact", "public.contact")
            .order_by("t.id ASC")
            .mutable(&["phone_number", "address", "description", "email", "work_schedule"]),
        TableAccessDescriptor::new("/admin/contact_page", "public.contact_page")
            .order_by("t.id ASC")
            .mutable(&["id", "phone_number", "address", "description", "image_url"]),
        TableAccessDescriptor::new("/admin/about_page", "public.about_page")
            .order_by("t.id ASC")
            .mutable(&[
                "id",
                "banner_image_url",
                "banner_title",
                "history_description",
                "video_url",
                "mission_description",
                "mission_image_url",
            ]),
        TableAccessDescriptor::new("/admin/about_metrics", "public.about_metrics")
            .order_by(BY_POSITION)
            .mutable(&["about_id", "metric_key", "metric_value", "metric_label", "position"])
            .required(&["metric_key", "metric_value", "metric_label"]),
        TableAccessDescriptor::new("/admin/about_sections", "public.about_sections")
            .order_by(BY_POSITION)
            .mutable(&["about_id", "section_key", "title", "description", "position"])
            .required(&["section_key", "title", "description"]),
        TableAccessDescriptor::new("/admin/partners", "public.partners")
            .order_by(BY_POSITION)
            .mutable(&["name", "logo_url", "position"])
            .required(&["logo_url"]),
        TableAccessDescriptor::new("/admin/tuning", "public.tuning")
            .order_by(NEWEST_FIRST)
            .mutable(&[
                "brand",
                "model",
                "card_image_url",
                "full_image_url",
                "price",
                "description",
                "card_description",
                "full_description",
                "video_image_url",
                "video_link",
            ])
            .json(&["full_image_url"])
            .touch_updated_at(),
        TableAccessDescriptor::new("/admin/service_offerings", "public.service_offerings")
            .order_by(BY_POSITION)
            .mutable(&["service_type", "title", "detailed_description", "gallery_images", "price_text", "position"])
            .required(&["service_type", "title"])
            .json(&["gallery_images"])
            .touch_updated_at(),
        TableAccessDescriptor::new("/admin/privacy_sections", "public.privacy_sections")
            .order_by(BY_POSITION)
            .mutable(&["title", "description", "position"])
            .required(&["title", "description"]),
        TableAccessDescriptor::new("/admin/portfolio_items", "public.portfolio_items")
            .order_by(NEWEST_FIRST)
            .mutable(&["brand", "title", "image_url", "description", "youtube_link"])
            .required(&["title", "image_url"]),
        post_table("/admin/work_post", "public.work_post"),
        post_table("/admin/blog_posts", "public.blog_posts"),
        TableAccessDescriptor::new("/admin/consultations", "public.consultations")
            .order_by(NEWEST_FIRST)
            .mutable(&[
                "first_name",
                "last_name",
                "phone",
                "service_type",
                "car_model",
                "preferred_call_time",
                "comments",
                "status",
            ])
            .required(&["first_name", "last_name", "phone", "service_type"]),
    ]
}
