/*!
Accessibility vocabulary.

Platform-specific notification strings are mapped in
`platform/macos/mapping.rs`.
*/

mod notification;

pub use notification::AxNotification;
