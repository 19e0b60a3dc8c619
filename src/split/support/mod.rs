pub mod ffmpeg;
pub mod ytdlp;
