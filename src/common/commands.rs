/// Lệnh UI gửi xuống tầng mạng.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// Nội dung ô nhập vừa thay đổi (mỗi lần gõ phím).
    InputChanged,
    /// Người dùng nhấn Enter / Send.
    SubmitText(String),
    /// Đóng ứng dụng: gửi `leave` nếu đang kết nối rồi dừng.
    Shutdown,
}
