use super::{label_elements, Catalog};
use crate::protocol::ModalOptions;
use crate::tree::{ContainerDescription, EventKind, Handler};

/// Modal dialog: title and close control on top, then a form holding the body
/// and the footer actions, so that actions collect the body's fields.
pub fn modal(catalog: &mut Catalog<'_>, o: &ModalOptions) -> ContainerDescription {
    let header = ContainerDescription::new("div")
        .class("modal-header")
        .child(
            ContainerDescription::new("h5")
                .class("modal-title")
                .children(label_elements(&o.title)),
        )
        .child(
            ContainerDescription::new("button")
                .class("btn-close")
                .attr("aria-label", "Close")
                .on(EventKind::Click, Handler::CloseModal),
        );
    let body = ContainerDescription::new("div")
        .class("modal-body")
        .children(catalog.lower(&o.content));
    let footer = ContainerDescription::new("div")
        .class("modal-footer")
        .children(catalog.lower_all(&o.actions));

    ContainerDescription::new("div")
        .class("modal")
        .modal()
        .child(
            ContainerDescription::new("div").class("modal-dialog").child(
                ContainerDescription::new("div")
                    .class("modal-content")
                    .child(header)
                    .child(ContainerDescription::new("form").child(body).child(footer)),
            ),
        )
}
